pub mod alignment;
pub mod config;
pub mod error;
pub mod feedback;
pub mod pipeline;
pub mod types;
pub mod viseme;

pub use alignment::align;
pub use alignment::corrections::{
    build_corrections, build_corrections_with_mapper, build_corrections_with_policy,
};
pub use alignment::report::{
    aggregate_reports, compute_utterance_report, AggregateReport, CorrectionTrace, Meta, Report,
    UtteranceReport, SCHEMA_VERSION,
};
pub use config::{EngineConfig, ErrorSetPolicy};
pub use error::DiscrepancyError;
pub use feedback::{build_prompt, ChatRole, ChatTurn, FeedbackGenerator, FeedbackSession};
pub use pipeline::builder::DiscrepancyEngineBuilder;
pub use pipeline::runtime::DiscrepancyEngine;
pub use pipeline::traits::{CorrectionBuilder, PhonemeAligner, VisemeTokenizer};
pub use types::{
    similarity_score, AlignmentResult, CorrectionKind, CorrectionRecord, Corrections,
    DiscrepancyInput, DiscrepancyOutput, EditOp, OpKind, Span, VisemeId,
};
pub use viseme::map_to_visemes;

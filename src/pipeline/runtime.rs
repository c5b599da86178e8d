use crate::alignment::opcodes::check_partition;
use crate::config::EngineConfig;
use crate::error::DiscrepancyError;
use crate::feedback::FeedbackSession;
use crate::pipeline::traits::{CorrectionBuilder, PhonemeAligner, VisemeTokenizer};
use crate::types::{DiscrepancyInput, DiscrepancyOutput};

/// Aligns an expected and an observed phoneme string and derives the
/// correction records. Holds no per-utterance state; `analyze` may be called
/// concurrently.
pub struct DiscrepancyEngine {
    config: EngineConfig,
    aligner: Box<dyn PhonemeAligner>,
    tokenizer: Box<dyn VisemeTokenizer>,
    correction_builder: Box<dyn CorrectionBuilder>,
}

pub(crate) struct DiscrepancyEngineParts {
    pub config: EngineConfig,
    pub aligner: Box<dyn PhonemeAligner>,
    pub tokenizer: Box<dyn VisemeTokenizer>,
    pub correction_builder: Box<dyn CorrectionBuilder>,
}

impl DiscrepancyEngine {
    pub(crate) fn from_parts(parts: DiscrepancyEngineParts) -> Self {
        Self {
            config: parts.config,
            aligner: parts.aligner,
            tokenizer: parts.tokenizer,
            correction_builder: parts.correction_builder,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A fresh feedback conversation using this engine's prompt and history limit.
    pub fn feedback_session(&self) -> FeedbackSession {
        FeedbackSession::from_config(&self.config)
    }

    pub fn analyze(&self, input: &DiscrepancyInput) -> Result<DiscrepancyOutput, DiscrepancyError> {
        let alignment = self.aligner.align(&input.reference, &input.observed);

        check_partition(
            &alignment.ops,
            input.reference.chars().count(),
            input.observed.chars().count(),
        )
        .map_err(|msg| DiscrepancyError::internal("phoneme alignment", msg))?;

        let corrections = self.correction_builder.build_corrections(
            &input.reference,
            &input.observed,
            &alignment,
            self.tokenizer.as_ref(),
            self.config.error_set,
        )?;
        let similarity = alignment.similarity();

        tracing::debug!(
            similarity,
            distance = alignment.distance,
            records = corrections.records.len(),
            error_phonemes = corrections.error_phonemes.len(),
            "engine: utterance analyzed"
        );

        Ok(DiscrepancyOutput {
            similarity,
            alignment,
            corrections,
        })
    }
}

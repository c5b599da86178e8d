use std::path::Path;

use crate::config::EngineConfig;
use crate::error::DiscrepancyError;
use crate::pipeline::defaults::{
    GreedyVisemeTokenizer, LevenshteinAligner, VisemeFanOutBuilder,
};
use crate::pipeline::runtime::{DiscrepancyEngine, DiscrepancyEngineParts};
use crate::pipeline::traits::{CorrectionBuilder, PhonemeAligner, VisemeTokenizer};

pub struct DiscrepancyEngineBuilder {
    config: EngineConfig,
    aligner: Option<Box<dyn PhonemeAligner>>,
    tokenizer: Option<Box<dyn VisemeTokenizer>>,
    correction_builder: Option<Box<dyn CorrectionBuilder>>,
}

impl DiscrepancyEngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            aligner: None,
            tokenizer: None,
            correction_builder: None,
        }
    }

    pub fn from_config_file(path: &Path) -> Result<Self, DiscrepancyError> {
        Ok(Self::new(EngineConfig::load(path)?))
    }

    pub fn with_aligner(mut self, aligner: Box<dyn PhonemeAligner>) -> Self {
        self.aligner = Some(aligner);
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: Box<dyn VisemeTokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn with_correction_builder(mut self, correction_builder: Box<dyn CorrectionBuilder>) -> Self {
        self.correction_builder = Some(correction_builder);
        self
    }

    pub fn build(self) -> Result<DiscrepancyEngine, DiscrepancyError> {
        if self.config.history_limit == 0 {
            return Err(DiscrepancyError::invalid_input(
                "history_limit must be >= 1 to retain the system prompt",
            ));
        }

        Ok(DiscrepancyEngine::from_parts(DiscrepancyEngineParts {
            config: self.config,
            aligner: self.aligner.unwrap_or_else(|| Box::new(LevenshteinAligner)),
            tokenizer: self
                .tokenizer
                .unwrap_or_else(|| Box::new(GreedyVisemeTokenizer)),
            correction_builder: self
                .correction_builder
                .unwrap_or_else(|| Box::new(VisemeFanOutBuilder)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ErrorSetPolicy;
    use crate::types::{
        AlignmentResult, CorrectionKind, DiscrepancyInput, EditOp, OpKind, Span, VisemeId,
    };

    use super::*;

    /// Reports a single equal op regardless of input.
    struct BrokenAligner;

    impl PhonemeAligner for BrokenAligner {
        fn align(&self, reference: &str, _observed: &str) -> AlignmentResult {
            let n = reference.chars().count();
            AlignmentResult {
                ops: vec![EditOp {
                    kind: OpKind::Equal,
                    ref_span: Span::new(0, n),
                    obs_span: Span::new(0, n),
                }],
                distance: 0,
                reference_len: n,
                observed_len: n,
            }
        }
    }

    /// Maps every codepoint to the lip-closure class.
    struct BilabialTokenizer;

    impl VisemeTokenizer for BilabialTokenizer {
        fn map_to_visemes(&self, segment: &str) -> Vec<VisemeId> {
            segment
                .chars()
                .filter_map(|_| VisemeId::new(21))
                .collect()
        }
    }

    fn input(reference: &str, observed: &str) -> DiscrepancyInput {
        DiscrepancyInput {
            reference: reference.to_string(),
            observed: observed.to_string(),
        }
    }

    #[test]
    fn build_with_defaults() {
        let engine = DiscrepancyEngineBuilder::new(EngineConfig::default())
            .build()
            .expect("build should succeed");
        let out = engine
            .analyze(&input("ænθənilaɪksæpəlpaɪ", "æmθənilaɪksæpəlpaɪ"))
            .unwrap();
        assert_eq!(out.similarity, 94);
        assert_eq!(out.corrections.records.len(), 1);
        let record = &out.corrections.records[0];
        assert_eq!(record.kind(), CorrectionKind::Substitution);
        assert_eq!(record.viseme(), VisemeId::new(19));
    }

    #[test]
    fn custom_tokenizer_reaches_correction_records() {
        let engine = DiscrepancyEngineBuilder::new(EngineConfig::default())
            .with_tokenizer(Box::new(BilabialTokenizer))
            .build()
            .unwrap();
        // "tʃ" is one token for the table mapper but two codepoints here.
        let out = engine.analyze(&input("tʃa", "xya")).unwrap();
        let visemes: Vec<_> = out
            .corrections
            .records
            .iter()
            .map(|r| r.viseme().map(VisemeId::get))
            .collect();
        assert_eq!(visemes, vec![Some(21), Some(21)]);
        assert_eq!(out.corrections.error_phonemes, vec!["tʃ"]);
    }

    #[test]
    fn build_rejects_zero_history_limit() {
        let config = EngineConfig {
            history_limit: 0,
            ..EngineConfig::default()
        };
        assert!(DiscrepancyEngineBuilder::new(config).build().is_err());
    }

    #[test]
    fn dedup_policy_flows_into_error_set() {
        let config = EngineConfig {
            error_set: ErrorSetPolicy::Dedup,
            ..EngineConfig::default()
        };
        let engine = DiscrepancyEngineBuilder::new(config).build().unwrap();
        let out = engine.analyze(&input("nakan", "makam")).unwrap();
        assert_eq!(out.corrections.error_phonemes, vec!["n"]);
    }

    #[test]
    fn inconsistent_custom_aligner_is_internal_error() {
        let engine = DiscrepancyEngineBuilder::new(EngineConfig::default())
            .with_aligner(Box::new(BrokenAligner))
            .build()
            .unwrap();
        let err = engine.analyze(&input("ab", "abc")).unwrap_err();
        assert!(matches!(err, crate::error::DiscrepancyError::Internal { .. }));
    }

    #[test]
    fn from_config_file_reads_json() {
        let path = std::env::temp_dir().join("viseme_align_builder_config.json");
        std::fs::write(&path, r#"{ "error_set": "dedup", "history_limit": 3 }"#)
            .expect("write config");
        let engine = DiscrepancyEngineBuilder::from_config_file(&path)
            .and_then(DiscrepancyEngineBuilder::build)
            .expect("build should succeed");
        assert_eq!(engine.config().error_set, ErrorSetPolicy::Dedup);
        assert_eq!(engine.feedback_session().history().len(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn from_config_file_missing_path_fails() {
        let result = DiscrepancyEngineBuilder::from_config_file(Path::new("/nonexistent/engine.json"));
        assert!(result.is_err());
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        let engine = std::sync::Arc::new(
            DiscrepancyEngineBuilder::new(EngineConfig::default())
                .build()
                .unwrap(),
        );
        let handles: Vec<_> = ["k", "ap", "tʃ"]
            .into_iter()
            .map(|reference| {
                let engine = std::sync::Arc::clone(&engine);
                std::thread::spawn(move || {
                    engine
                        .analyze(&input(reference, reference))
                        .map(|out| out.similarity)
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 100);
        }
    }
}

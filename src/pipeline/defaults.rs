use crate::alignment::align;
use crate::alignment::corrections::build_corrections_with_mapper;
use crate::config::ErrorSetPolicy;
use crate::error::DiscrepancyError;
use crate::pipeline::traits::{CorrectionBuilder, PhonemeAligner, VisemeTokenizer};
use crate::types::{AlignmentResult, Corrections, VisemeId};
use crate::viseme::map_to_visemes;

pub struct LevenshteinAligner;

impl PhonemeAligner for LevenshteinAligner {
    fn align(&self, reference: &str, observed: &str) -> AlignmentResult {
        align(reference, observed)
    }
}

pub struct GreedyVisemeTokenizer;

impl VisemeTokenizer for GreedyVisemeTokenizer {
    fn map_to_visemes(&self, segment: &str) -> Vec<VisemeId> {
        map_to_visemes(segment)
    }
}

pub struct VisemeFanOutBuilder;

impl CorrectionBuilder for VisemeFanOutBuilder {
    fn build_corrections(
        &self,
        reference: &str,
        observed: &str,
        alignment: &AlignmentResult,
        tokenizer: &dyn VisemeTokenizer,
        policy: ErrorSetPolicy,
    ) -> Result<Corrections, DiscrepancyError> {
        build_corrections_with_mapper(reference, observed, alignment, policy, |segment| {
            tokenizer.map_to_visemes(segment)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::corrections::build_corrections_with_policy;

    #[test]
    fn levenshtein_aligner_align() {
        let aligner = LevenshteinAligner;
        let result = aligner.align("ap", "apl");
        assert_eq!(result, align("ap", "apl"));
    }

    #[test]
    fn greedy_viseme_tokenizer_map_to_visemes() {
        let tokenizer = GreedyVisemeTokenizer;
        assert_eq!(tokenizer.map_to_visemes("tʃb"), map_to_visemes("tʃb"));
        assert!(tokenizer.map_to_visemes("").is_empty());
    }

    #[test]
    fn viseme_fan_out_builder_build_corrections() {
        let builder = VisemeFanOutBuilder;
        let alignment = align("k", "");
        let corrections = builder
            .build_corrections(
                "k",
                "",
                &alignment,
                &GreedyVisemeTokenizer,
                ErrorSetPolicy::Preserve,
            )
            .unwrap();
        let expected = build_corrections_with_policy("k", "", &alignment, ErrorSetPolicy::Preserve)
            .unwrap();
        assert_eq!(corrections, expected);
    }
}

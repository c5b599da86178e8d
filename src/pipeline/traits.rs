use crate::config::ErrorSetPolicy;
use crate::error::DiscrepancyError;
use crate::types::{AlignmentResult, Corrections, VisemeId};

pub trait PhonemeAligner: Send + Sync {
    fn align(&self, reference: &str, observed: &str) -> AlignmentResult;
}

pub trait VisemeTokenizer: Send + Sync {
    /// Ordered viseme ids for `segment`. Empty iff `segment` is empty.
    fn map_to_visemes(&self, segment: &str) -> Vec<VisemeId>;
}

pub trait CorrectionBuilder: Send + Sync {
    fn build_corrections(
        &self,
        reference: &str,
        observed: &str,
        alignment: &AlignmentResult,
        tokenizer: &dyn VisemeTokenizer,
        policy: ErrorSetPolicy,
    ) -> Result<Corrections, DiscrepancyError>;
}

use std::collections::HashSet;

use crate::alignment::opcodes::check_partition;
use crate::config::ErrorSetPolicy;
use crate::error::DiscrepancyError;
use crate::types::{AlignmentResult, CorrectionRecord, Corrections, OpKind, VisemeId};
use crate::viseme::map_to_visemes;

/// Walk `alignment` and fan every non-equal op out into correction records.
/// Duplicate error segments are preserved.
pub fn build_corrections(
    reference: &str,
    observed: &str,
    alignment: &AlignmentResult,
) -> Result<Corrections, DiscrepancyError> {
    build_corrections_with_policy(reference, observed, alignment, ErrorSetPolicy::Preserve)
}

pub fn build_corrections_with_policy(
    reference: &str,
    observed: &str,
    alignment: &AlignmentResult,
    policy: ErrorSetPolicy,
) -> Result<Corrections, DiscrepancyError> {
    build_corrections_with_mapper(reference, observed, alignment, policy, map_to_visemes)
}

/// Same as [`build_corrections_with_policy`], with `mapper` turning each
/// reference segment into its viseme sequence.
pub fn build_corrections_with_mapper<F>(
    reference: &str,
    observed: &str,
    alignment: &AlignmentResult,
    policy: ErrorSetPolicy,
    mapper: F,
) -> Result<Corrections, DiscrepancyError>
where
    F: Fn(&str) -> Vec<VisemeId>,
{
    let ref_chars: Vec<char> = reference.chars().collect();
    let obs_len = observed.chars().count();
    if alignment.reference_len != ref_chars.len() || alignment.observed_len != obs_len {
        return Err(DiscrepancyError::invalid_input(format!(
            "alignment was computed for lengths {} / {}, got strings of {} / {}",
            alignment.reference_len,
            alignment.observed_len,
            ref_chars.len(),
            obs_len
        )));
    }
    check_partition(&alignment.ops, ref_chars.len(), obs_len)
        .map_err(DiscrepancyError::invalid_input)?;

    let mut records = Vec::new();
    let mut error_phonemes = Vec::new();

    for op in &alignment.ops {
        match op.kind {
            OpKind::Equal => {}
            OpKind::Insert => {
                records.push(CorrectionRecord::Insertion {
                    ref_span: op.ref_span,
                    obs_span: op.obs_span,
                });
            }
            OpKind::Substitute | OpKind::Delete => {
                let correct: String = ref_chars[op.ref_span.start..op.ref_span.end]
                    .iter()
                    .collect();
                let visemes = mapper(&correct);
                tracing::debug!(
                    kind = op.kind.as_str(),
                    ref_start = op.ref_span.start,
                    ref_end = op.ref_span.end,
                    correct = correct.as_str(),
                    viseme_count = visemes.len(),
                    "corrections: fanning out op"
                );

                let make = |viseme: Option<VisemeId>| match op.kind {
                    OpKind::Substitute => CorrectionRecord::Substitution {
                        ref_span: op.ref_span,
                        obs_span: op.obs_span,
                        correct_phonemes: correct.clone(),
                        viseme,
                    },
                    _ => CorrectionRecord::Deletion {
                        ref_span: op.ref_span,
                        obs_span: op.obs_span,
                        correct_phonemes: correct.clone(),
                        viseme,
                    },
                };
                if visemes.is_empty() {
                    // Never drop an op, even when there is nothing to map.
                    records.push(make(None));
                } else {
                    records.extend(visemes.into_iter().map(|id| make(Some(id))));
                }
                error_phonemes.push(correct);
            }
        }
    }

    if policy == ErrorSetPolicy::Dedup {
        let mut seen = HashSet::new();
        error_phonemes.retain(|p| seen.insert(p.clone()));
    }

    Ok(Corrections {
        records,
        error_phonemes,
    })
}

pub mod corrections;
pub mod edit_distance;
pub mod opcodes;
pub mod report;

use crate::types::AlignmentResult;

/// Align `reference` against `observed` codepoint by codepoint and group the
/// minimal edit script into opcodes.
///
/// Total over all pairs of strings. The returned ops partition both strings.
pub fn align(reference: &str, observed: &str) -> AlignmentResult {
    let ref_chars: Vec<char> = reference.chars().collect();
    let obs_chars: Vec<char> = observed.chars().collect();

    let script = edit_distance::edit_script(&ref_chars, &obs_chars);
    let ops = opcodes::group_opcodes(&script.steps);

    debug_assert_eq!(
        edit_distance::edit_distance(&ref_chars, &obs_chars),
        script.distance,
        "backtracked script disagrees with the rolling-row distance"
    );
    debug_assert_eq!(
        opcodes::check_partition(&ops, ref_chars.len(), obs_chars.len()),
        Ok(()),
        "opcode partition contract violated"
    );

    tracing::debug!(
        reference_len = ref_chars.len(),
        observed_len = obs_chars.len(),
        distance = script.distance,
        op_count = ops.len(),
        "alignment: edit script grouped"
    );

    AlignmentResult {
        ops,
        distance: script.distance,
        reference_len: ref_chars.len(),
        observed_len: obs_chars.len(),
    }
}

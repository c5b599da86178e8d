use crate::types::OpKind;

const BP_EQUAL: u8 = 0;
const BP_SUBSTITUTE: u8 = 1;
const BP_DELETE: u8 = 2;
const BP_INSERT: u8 = 3;

/// Single-codepoint edit script recovered from the DP table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditScript {
    pub steps: Vec<OpKind>,
    pub distance: usize,
}

/// Unit-cost Levenshtein distance over codepoints with a deterministic
/// backtrack.
///
/// When a cell is reachable from several predecessors at the same cost the
/// backpointer prefers, in order: match, substitution, deletion, insertion.
/// Costs are kept in two rolling rows; backpointers take one byte per cell.
pub fn edit_script(reference: &[char], observed: &[char]) -> EditScript {
    let n = reference.len();
    let m = observed.len();
    let width = m + 1;

    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr = vec![0usize; width];
    let mut bp = vec![BP_INSERT; (n + 1) * width];
    bp[0] = BP_EQUAL;

    for i in 1..=n {
        curr[0] = i;
        bp[i * width] = BP_DELETE;
        let r = reference[i - 1];
        for j in 1..=m {
            let (cost, step) = best_transition(&prev, &curr, j, r == observed[j - 1]);
            curr[j] = cost;
            bp[i * width + j] = step;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    let distance = prev[m];

    let mut steps = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        let step = bp[i * width + j];
        match step {
            BP_EQUAL => {
                debug_assert!(i >= 1 && j >= 1);
                steps.push(OpKind::Equal);
                i -= 1;
                j -= 1;
            }
            BP_SUBSTITUTE => {
                debug_assert!(i >= 1 && j >= 1);
                steps.push(OpKind::Substitute);
                i -= 1;
                j -= 1;
            }
            BP_DELETE => {
                debug_assert!(i >= 1);
                steps.push(OpKind::Delete);
                i -= 1;
            }
            _ => {
                debug_assert!(j >= 1);
                steps.push(OpKind::Insert);
                j -= 1;
            }
        }
    }
    steps.reverse();

    EditScript { steps, distance }
}

/// Distance only, without the backpointer table.
pub fn edit_distance(reference: &[char], observed: &[char]) -> usize {
    let m = observed.len();
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr = vec![0usize; m + 1];
    for (i, &r) in reference.iter().enumerate() {
        curr[0] = i + 1;
        for j in 1..=m {
            curr[j] = best_transition(&prev, &curr, j, r == observed[j - 1]).0;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[m]
}

#[inline(always)]
fn best_transition(prev: &[usize], curr: &[usize], j: usize, same: bool) -> (usize, u8) {
    let diag = prev[j - 1];
    let (mut best, mut step) = if same {
        (diag, BP_EQUAL)
    } else {
        (diag + 1, BP_SUBSTITUTE)
    };

    let delete = prev[j] + 1;
    if delete < best {
        best = delete;
        step = BP_DELETE;
    }

    let insert = curr[j - 1] + 1;
    if insert < best {
        best = insert;
        step = BP_INSERT;
    }

    (best, step)
}

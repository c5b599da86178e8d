use crate::types::{EditOp, OpKind, Span};

/// Merge consecutive single-codepoint steps of the same kind into maximal
/// opcode spans.
pub fn group_opcodes(steps: &[OpKind]) -> Vec<EditOp> {
    let mut ops: Vec<EditOp> = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);

    for &kind in steps {
        let (di, dj) = match kind {
            OpKind::Equal | OpKind::Substitute => (1, 1),
            OpKind::Delete => (1, 0),
            OpKind::Insert => (0, 1),
        };
        match ops.last_mut() {
            Some(last) if last.kind == kind => {
                last.ref_span.end += di;
                last.obs_span.end += dj;
            }
            _ => ops.push(EditOp {
                kind,
                ref_span: Span::new(i, i + di),
                obs_span: Span::new(j, j + dj),
            }),
        }
        i += di;
        j += dj;
    }
    ops
}

/// Check that the ref spans of `ops` tile `[0, reference_len)` and the obs
/// spans tile `[0, observed_len)`, and that each span shape fits its kind.
pub fn check_partition(
    ops: &[EditOp],
    reference_len: usize,
    observed_len: usize,
) -> Result<(), String> {
    let (mut i, mut j) = (0usize, 0usize);
    for (idx, op) in ops.iter().enumerate() {
        if op.ref_span.start != i || op.obs_span.start != j {
            return Err(format!(
                "op #{idx} ({}) starts at ref {} / obs {}, expected {i} / {j}",
                op.kind.as_str(),
                op.ref_span.start,
                op.obs_span.start
            ));
        }
        if op.ref_span.end < op.ref_span.start || op.obs_span.end < op.obs_span.start {
            return Err(format!("op #{idx} ({}) has a reversed span", op.kind.as_str()));
        }
        let (rl, ol) = (op.ref_span.len(), op.obs_span.len());
        let shape_ok = match op.kind {
            OpKind::Equal | OpKind::Substitute => rl > 0 && rl == ol,
            OpKind::Delete => rl > 0 && ol == 0,
            OpKind::Insert => rl == 0 && ol > 0,
        };
        if !shape_ok {
            return Err(format!(
                "op #{idx} ({}) has span lengths ref={rl} obs={ol}",
                op.kind.as_str()
            ));
        }
        i = op.ref_span.end;
        j = op.obs_span.end;
    }
    if i != reference_len || j != observed_len {
        return Err(format!(
            "ops cover ref {i} / obs {j}, expected {reference_len} / {observed_len}"
        ));
    }
    Ok(())
}

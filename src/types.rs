use std::fmt;

use serde::Serialize;

/// Half-open codepoint interval `[start, end)` into a phoneme string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Slice `text` by codepoint offsets. Out-of-range offsets yield the
    /// overlapping part only.
    pub fn slice(&self, text: &str) -> String {
        text.chars()
            .skip(self.start)
            .take(self.end.saturating_sub(self.start))
            .collect()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Equal,
    Substitute,
    Insert,
    Delete,
}

impl OpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Substitute => "substitute",
            Self::Insert => "insert",
            Self::Delete => "delete",
        }
    }
}

/// One grouped opcode. `Insert` has an empty `ref_span`, `Delete` an empty `obs_span`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EditOp {
    pub kind: OpKind,
    pub ref_span: Span,
    pub obs_span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignmentResult {
    pub ops: Vec<EditOp>,
    pub distance: usize,
    /// Codepoint length of the reference string.
    pub reference_len: usize,
    /// Codepoint length of the observed string.
    pub observed_len: usize,
}

impl AlignmentResult {
    /// Integer percentage similarity in [0, 100]. Two empty strings are 100.
    pub fn similarity(&self) -> u8 {
        similarity_score(self.distance, self.reference_len, self.observed_len)
    }

    pub fn is_exact_match(&self) -> bool {
        self.distance == 0
    }

    /// Ops other than `Equal`, in order.
    pub fn errors(&self) -> impl Iterator<Item = &EditOp> {
        self.ops.iter().filter(|op| op.kind != OpKind::Equal)
    }
}

/// `round(100 * (1 - distance / max(reference_len, observed_len)))`, rounding
/// halves up, clamped to [0, 100].
pub fn similarity_score(distance: usize, reference_len: usize, observed_len: usize) -> u8 {
    let longest = reference_len.max(observed_len);
    if longest == 0 {
        return 100;
    }
    let kept = longest.saturating_sub(distance);
    // Integer form of round-half-up on 100 * kept / longest.
    let pct = (kept * 200 + longest) / (2 * longest);
    pct.min(100) as u8
}

/// Articulation class id in [0, 21]. 0 is silence / unmapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VisemeId(u8);

impl VisemeId {
    pub const SILENCE: VisemeId = VisemeId(0);
    pub const MAX: u8 = 21;

    pub const fn new(id: u8) -> Option<Self> {
        if id <= Self::MAX {
            Some(Self(id))
        } else {
            None
        }
    }

    pub(crate) const fn from_table(id: u8) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn is_silence(self) -> bool {
        self.0 == 0
    }

    /// Deterministic key the presentation layer resolves to an image.
    pub fn asset_key(self) -> String {
        format!("viseme-id-{}", self.0)
    }

    pub fn all() -> impl Iterator<Item = VisemeId> {
        (0..=Self::MAX).map(VisemeId)
    }
}

impl fmt::Display for VisemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionKind {
    Substitution,
    Insertion,
    Deletion,
}

impl CorrectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Substitution => "substitution",
            Self::Insertion => "insertion",
            Self::Deletion => "deletion",
        }
    }

    /// Feedback card order: substitutions, insertions, deletions.
    pub(crate) fn group_rank(self) -> u8 {
        match self {
            Self::Substitution => 0,
            Self::Insertion => 1,
            Self::Deletion => 2,
        }
    }
}

/// A correction derived from one non-equal opcode. Each record carries at
/// most one viseme; multi-phoneme spans fan out into several records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CorrectionRecord {
    Substitution {
        ref_span: Span,
        obs_span: Span,
        correct_phonemes: String,
        viseme: Option<VisemeId>,
    },
    Insertion {
        ref_span: Span,
        obs_span: Span,
    },
    Deletion {
        ref_span: Span,
        obs_span: Span,
        correct_phonemes: String,
        viseme: Option<VisemeId>,
    },
}

impl CorrectionRecord {
    pub fn kind(&self) -> CorrectionKind {
        match self {
            Self::Substitution { .. } => CorrectionKind::Substitution,
            Self::Insertion { .. } => CorrectionKind::Insertion,
            Self::Deletion { .. } => CorrectionKind::Deletion,
        }
    }

    pub fn ref_span(&self) -> Span {
        match self {
            Self::Substitution { ref_span, .. }
            | Self::Insertion { ref_span, .. }
            | Self::Deletion { ref_span, .. } => *ref_span,
        }
    }

    pub fn obs_span(&self) -> Span {
        match self {
            Self::Substitution { obs_span, .. }
            | Self::Insertion { obs_span, .. }
            | Self::Deletion { obs_span, .. } => *obs_span,
        }
    }

    pub fn correct_phonemes(&self) -> Option<&str> {
        match self {
            Self::Substitution {
                correct_phonemes, ..
            }
            | Self::Deletion {
                correct_phonemes, ..
            } => Some(correct_phonemes.as_str()),
            Self::Insertion { .. } => None,
        }
    }

    pub fn viseme(&self) -> Option<VisemeId> {
        match self {
            Self::Substitution { viseme, .. } | Self::Deletion { viseme, .. } => *viseme,
            Self::Insertion { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Corrections {
    /// Records in opcode order.
    pub records: Vec<CorrectionRecord>,
    /// Reference segments under every `Substitute`/`Delete` op, in op order.
    pub error_phonemes: Vec<String>,
}

impl Corrections {
    /// Records ordered substitutions, then insertions, then deletions. The sort
    /// is stable, so each group keeps ascending `ref_span.start` and fanned-out
    /// records stay adjacent.
    pub fn grouped(&self) -> Vec<&CorrectionRecord> {
        let mut out: Vec<&CorrectionRecord> = self.records.iter().collect();
        out.sort_by_key(|record| record.kind().group_rank());
        out
    }

    pub fn of_kind(&self, kind: CorrectionKind) -> impl Iterator<Item = &CorrectionRecord> {
        self.records.iter().filter(move |r| r.kind() == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct DiscrepancyInput {
    /// Expected phonemes from the text-to-phoneme synthesizer.
    pub reference: String,
    /// Phonemes produced by the speech recognizer.
    pub observed: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscrepancyOutput {
    pub similarity: u8,
    pub alignment: AlignmentResult,
    pub corrections: Corrections,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_slice_uses_codepoints() {
        let text = "æpəl";
        assert_eq!(Span::new(1, 3).slice(text), "pə");
        assert_eq!(Span::empty(2).slice(text), "");
        assert_eq!(Span::new(3, 9).slice(text), "l");
    }

    #[test]
    fn similarity_of_two_empty_strings_is_full() {
        assert_eq!(similarity_score(0, 0, 0), 100);
    }

    #[test]
    fn similarity_rounds_to_nearest() {
        assert_eq!(similarity_score(1, 2, 3), 67);
        assert_eq!(similarity_score(1, 18, 18), 94);
        assert_eq!(similarity_score(1, 19, 19), 95);
        assert_eq!(similarity_score(1, 1, 0), 0);
        // 87.5 rounds up
        assert_eq!(similarity_score(1, 8, 8), 88);
    }

    #[test]
    fn similarity_clamps_to_zero() {
        assert_eq!(similarity_score(10, 2, 3), 0);
    }

    #[test]
    fn viseme_id_bounds() {
        assert!(VisemeId::new(21).is_some());
        assert!(VisemeId::new(22).is_none());
        assert!(VisemeId::SILENCE.is_silence());
        assert_eq!(VisemeId::all().count(), 22);
    }

    #[test]
    fn viseme_asset_key() {
        let id = VisemeId::new(16).unwrap();
        assert_eq!(id.asset_key(), "viseme-id-16");
    }

    #[test]
    fn grouped_orders_by_kind_and_keeps_position() {
        let sub = |start: usize, v: u8| CorrectionRecord::Substitution {
            ref_span: Span::new(start, start + 1),
            obs_span: Span::new(start, start + 1),
            correct_phonemes: "n".to_string(),
            viseme: VisemeId::new(v),
        };
        let del = |start: usize| CorrectionRecord::Deletion {
            ref_span: Span::new(start, start + 1),
            obs_span: Span::empty(start),
            correct_phonemes: "k".to_string(),
            viseme: VisemeId::new(20),
        };
        let ins = |at: usize| CorrectionRecord::Insertion {
            ref_span: Span::empty(at),
            obs_span: Span::new(at, at + 1),
        };
        let corrections = Corrections {
            records: vec![del(0), sub(2, 19), ins(4), sub(6, 21), sub(6, 1)],
            error_phonemes: Vec::new(),
        };
        let kinds: Vec<_> = corrections
            .grouped()
            .iter()
            .map(|r| (r.kind(), r.ref_span().start, r.viseme().map(VisemeId::get)))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (CorrectionKind::Substitution, 2, Some(19)),
                (CorrectionKind::Substitution, 6, Some(21)),
                (CorrectionKind::Substitution, 6, Some(1)),
                (CorrectionKind::Insertion, 4, None),
                (CorrectionKind::Deletion, 0, Some(20)),
            ]
        );
    }

    #[test]
    fn correction_record_serializes_with_kind_tag() {
        let record = CorrectionRecord::Insertion {
            ref_span: Span::empty(2),
            obs_span: Span::new(2, 3),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "insertion");
        assert_eq!(json["obs_span"]["end"], 3);
        assert!(json.get("viseme").is_none());
    }
}

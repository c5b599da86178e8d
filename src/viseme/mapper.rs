use crate::types::{Span, VisemeId};
use crate::viseme::table;

/// One token consumed by the greedy scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisemeToken<'a> {
    pub phoneme: &'a str,
    /// Codepoint span relative to the scanned segment.
    pub span: Span,
    pub viseme: VisemeId,
    /// False when the codepoint is absent from the table and degraded to silence.
    pub mapped: bool,
}

/// Greedy left-to-right tokenization of `segment`, two-codepoint match first,
/// then one codepoint, otherwise silence for a single codepoint.
pub fn tokenize(segment: &str) -> Vec<VisemeToken<'_>> {
    // Byte offset of every codepoint boundary, end included.
    let bounds: Vec<usize> = segment
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(segment.len()))
        .collect();
    let n = bounds.len() - 1;

    let mut tokens = Vec::with_capacity(n);
    let mut i = 0usize;
    while i < n {
        let pair = if i + 2 <= n {
            let token = &segment[bounds[i]..bounds[i + 2]];
            table::lookup(token).map(|id| (token, id))
        } else {
            None
        };
        if let Some((phoneme, viseme)) = pair {
            tokens.push(VisemeToken {
                phoneme,
                span: Span::new(i, i + 2),
                viseme,
                mapped: true,
            });
            i += 2;
            continue;
        }

        let phoneme = &segment[bounds[i]..bounds[i + 1]];
        let (viseme, mapped) = match table::lookup(phoneme) {
            Some(id) => (id, true),
            None => {
                tracing::debug!(phoneme, position = i, "viseme: unmapped phoneme, using silence");
                (VisemeId::SILENCE, false)
            }
        };
        tokens.push(VisemeToken {
            phoneme,
            span: Span::new(i, i + 1),
            viseme,
            mapped,
        });
        i += 1;
    }
    tokens
}

/// Ordered viseme ids for `segment`. Empty iff `segment` is empty.
pub fn map_to_visemes(segment: &str) -> Vec<VisemeId> {
    tokenize(segment).into_iter().map(|t| t.viseme).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(segment: &str) -> Vec<u8> {
        map_to_visemes(segment).into_iter().map(VisemeId::get).collect()
    }

    #[test]
    fn empty_segment_maps_to_nothing() {
        assert!(map_to_visemes("").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn single_consonants() {
        assert_eq!(ids("n"), vec![19]);
        assert_eq!(ids("k"), vec![20]);
        assert_eq!(ids("pbm"), vec![21, 21, 21]);
    }

    #[test]
    fn two_codepoint_cluster_wins_over_single_lookups() {
        // 't' alone is 19 and 'ʃ' alone is 16; the affricate must stay whole.
        assert_eq!(ids("tʃ"), vec![16]);
        assert_eq!(ids("dʒ"), vec![16]);
        assert_eq!(ids("aɪ"), vec![11]);
        assert_eq!(ids("gtʃb"), vec![20, 16, 21]);
    }

    #[test]
    fn length_marked_vowels_are_one_token() {
        assert_eq!(ids("iː"), vec![6]);
        assert_eq!(ids("ɑːɔː"), vec![2, 3]);
    }

    #[test]
    fn unmapped_codepoints_degrade_to_silence() {
        assert_eq!(ids("x"), vec![0]);
        assert_eq!(ids("ˈæ"), vec![0, 1]);
        // stray length mark after a vowel with no long form
        assert_eq!(ids("əː"), vec![1, 0]);
        let tokens = tokenize("xq");
        assert!(tokens.iter().all(|t| !t.mapped));
    }

    #[test]
    fn tokens_carry_codepoint_spans() {
        let tokens = tokenize("laɪks");
        let spans: Vec<_> = tokens.iter().map(|t| (t.phoneme, t.span)).collect();
        assert_eq!(
            spans,
            vec![
                ("l", Span::new(0, 1)),
                ("aɪ", Span::new(1, 3)),
                ("k", Span::new(3, 4)),
                ("s", Span::new(4, 5)),
            ]
        );
    }

    #[test]
    fn greedy_scan_pairs_from_the_left() {
        // "aʊ" pairs before "ʊ" could be considered on its own.
        assert_eq!(ids("aʊɪ"), vec![9, 6]);
        // "əʊ" is registered, so the schwa is not read alone.
        assert_eq!(ids("əʊ"), vec![8]);
    }
}

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::types::VisemeId;

/// Longest token registered in the table, in codepoints.
pub const MAX_TOKEN_CHARS: usize = 2;

/// Phoneme token to viseme id. Tokens are one or two codepoints; length-marked
/// vowels, diphthongs and affricates are two.
const ENTRIES: &[(&str, u8)] = &[
    // silence
    ("_", 0),
    (" ", 0),
    // ae, ax, ah
    ("æ", 1),
    ("a", 1),
    ("ə", 1),
    ("ʌ", 1),
    ("ɐ", 1),
    // aa
    ("ɑ", 2),
    ("ɑː", 2),
    ("ɒ", 2),
    // ao
    ("ɔ", 3),
    ("ɔː", 3),
    // ey
    ("e", 4),
    ("eɪ", 4),
    ("ɛ", 4),
    // er
    ("ɜ", 5),
    ("ɜː", 5),
    ("ɝ", 5),
    ("ɚ", 5),
    // y, iy, ih, ix
    ("j", 6),
    ("i", 6),
    ("iː", 6),
    ("ɪ", 6),
    ("ɨ", 6),
    // w, uw
    ("w", 7),
    ("u", 7),
    ("uː", 7),
    ("ʊ", 7),
    // ow
    ("o", 8),
    ("oʊ", 8),
    ("əʊ", 8),
    // aw
    ("aʊ", 9),
    // oy
    ("ɔɪ", 10),
    // ay
    ("aɪ", 11),
    // h
    ("h", 12),
    ("ɦ", 12),
    // r
    ("r", 13),
    ("ɹ", 13),
    ("ɾ", 13),
    // l
    ("l", 14),
    ("ɫ", 14),
    // s, z
    ("s", 15),
    ("z", 15),
    // sh, ch, jh, zh
    ("ʃ", 16),
    ("tʃ", 16),
    ("dʒ", 16),
    ("ʒ", 16),
    // th, dh
    ("θ", 17),
    ("ð", 17),
    // f, v
    ("f", 18),
    ("v", 18),
    // d, t, n
    ("d", 19),
    ("t", 19),
    ("n", 19),
    // k, g, ng (ASCII g and IPA ɡ both occur in recognizer output)
    ("k", 20),
    ("g", 20),
    ("ŋ", 20),
    ("ɡ", 20),
    // p, b, m
    ("p", 21),
    ("b", 21),
    ("m", 21),
];

const DESCRIPTIONS: [&str; VisemeId::MAX as usize + 1] = [
    "Silence: neutral or closed mouth, lips relaxed.",
    "æ, a, ə, ʌ, ɐ: mid-open jaw, lips relaxed or slightly spread (as in 'cat', 'cup').",
    "ɑ, ɑː, ɒ: wide open mouth, lips relaxed or slightly rounded (as in 'father', 'cot').",
    "ɔ, ɔː: rounded lips, mid-open mouth, tongue slightly back (as in 'caught', 'law').",
    "e, eɪ, ɛ: half-open mouth, lips slightly spread, tongue mid-front (as in 'bed', 'say').",
    "ɜ, ɜː, ɝ, ɚ: mid-central vowel, lips slightly rounded, tongue bunched (as in 'bird', 'fur').",
    "j, i, iː, ɪ, ɨ: spread lips in a smile shape, mouth nearly closed, tongue high and front (as in 'see', 'yes').",
    "w, u, uː, ʊ: rounded lips pushed forward, little jaw movement (as in 'boot', 'wood').",
    "o, oʊ, əʊ: rounded lips, slightly open, looser than /u/ (as in 'go', 'boat').",
    "aʊ: jaw drops, then lips round (open to rounded, as in 'now', 'out').",
    "ɔɪ: rounded lips gliding to spread (as in 'boy', 'toy').",
    "aɪ: jaw drops, then lips spread (open to spread, as in 'my', 'sky').",
    "h, ɦ: slightly open mouth, lips neutral, breathy airflow (as in 'hat').",
    "r, ɹ, ɾ: lips slightly rounded, corners drawn in, small opening (as in 'red').",
    "l, ɫ: tongue tip on the alveolar ridge, mouth slightly open (as in 'let').",
    "s, z: lips slightly parted, teeth nearly closed, corners pulled back (as in 'see', 'zoo').",
    "ʃ, tʃ, dʒ, ʒ: rounded lips, jaw slightly lowered, teeth close (as in 'shoe', 'judge').",
    "θ, ð: tongue between the teeth, lips relaxed (as in 'think', 'this').",
    "f, v: upper teeth on the lower lip, narrow gap (as in 'fun', 'van').",
    "d, t, n: light tongue contact on the upper ridge, lips neutral (as in 'do', 'no').",
    "k, g, ŋ: mouth slightly open, lips neutral, tongue back (as in 'go', 'sing').",
    "p, b, m: closed lips, full bilabial contact (as in 'pat', 'bat', 'man').",
];

fn index() -> &'static HashMap<&'static str, VisemeId> {
    static INDEX: OnceLock<HashMap<&'static str, VisemeId>> = OnceLock::new();
    INDEX.get_or_init(|| {
        ENTRIES
            .iter()
            .map(|&(token, id)| (token, VisemeId::from_table(id)))
            .collect()
    })
}

/// Viseme for an exact token, or `None` when the token is not registered.
pub fn lookup(token: &str) -> Option<VisemeId> {
    index().get(token).copied()
}

/// Articulation description for a viseme id.
pub fn description(id: VisemeId) -> &'static str {
    DESCRIPTIONS[id.get() as usize]
}

/// Registered tokens mapping to `id`, in table order.
pub fn phonemes_for(id: VisemeId) -> impl Iterator<Item = &'static str> {
    ENTRIES
        .iter()
        .filter(move |&&(_, v)| v == id.get())
        .map(|&(token, _)| token)
}

pub fn entries() -> impl Iterator<Item = (&'static str, VisemeId)> {
    ENTRIES
        .iter()
        .map(|&(token, id)| (token, VisemeId::from_table(id)))
}

use std::fs;
use std::path::{Path, PathBuf};

use viseme_align::{CorrectionKind, CorrectionTrace, Report, UtteranceReport};

/// Write `report` as pretty JSON to `path` and its feedback cards to a
/// sibling `.cards.txt` file. Returns the cards path.
pub fn write_report(path: &Path, report: &Report) -> Result<PathBuf, String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            format!("Failed to create report directory '{}': {err}", parent.display())
        })?;
    }

    let mut json = serde_json::to_string_pretty(report)
        .map_err(|err| format!("Failed to serialize discrepancy report: {err}"))?;
    json.push('\n');
    fs::write(path, json)
        .map_err(|err| format!("Failed to write report '{}': {err}", path.display()))?;

    let cards_path = path.with_extension("cards.txt");
    fs::write(&cards_path, render_cards(report))
        .map_err(|err| format!("Failed to write cards '{}': {err}", cards_path.display()))?;
    Ok(cards_path)
}

/// Plain-text feedback cards, one block per utterance. Corrections keep the
/// report order: substitutions, insertions, deletions.
pub fn render_cards(report: &Report) -> String {
    let mut lines = Vec::new();
    for utterance in &report.utterances {
        push_utterance(&mut lines, utterance);
    }
    lines.join("\n")
}

fn push_utterance(lines: &mut Vec<String>, utterance: &UtteranceReport) {
    lines.push(format!(
        "{}  similarity {}%  distance {}",
        utterance.id, utterance.similarity, utterance.distance
    ));
    lines.push(format!("  expected  {}", utterance.reference));
    lines.push(format!("  observed  {}", utterance.observed));
    if utterance.corrections.is_empty() {
        lines.push("  no corrections".to_string());
    }
    lines.extend(utterance.corrections.iter().map(card_line));
    if !utterance.error_phonemes.is_empty() {
        lines.push(format!("  mistakes  {}", utterance.error_phonemes.join(" ")));
    }
    lines.push(String::new());
}

fn card_line(trace: &CorrectionTrace) -> String {
    match trace.kind {
        CorrectionKind::Insertion => format!("  insertion     extra sound at {}", trace.obs_span),
        kind => {
            let correct = trace.correct_phonemes.as_deref().unwrap_or("");
            let viseme = trace.asset_key.as_deref().unwrap_or("-");
            let description = trace.description.unwrap_or("");
            format!(
                "  {:<12}  say '{correct}' at {}  {viseme}  {description}",
                kind.as_str(),
                trace.ref_span
            )
        }
    }
}

use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;

use serde::Serialize;

use crate::types::{
    CorrectionKind, CorrectionRecord, DiscrepancyOutput, EditOp, OpKind, Span, VisemeId,
};
use crate::viseme::{self, table};

pub const SCHEMA_VERSION: u32 = 1;
const OUTLIER_TOP_N: usize = 20;
const TOP_VISEME_N: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    pub utterances: Vec<UtteranceReport>,
    pub aggregates: AggregateReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub error_set: String,
    pub case_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UtteranceReport {
    pub id: String,
    pub reference: String,
    pub observed: String,
    pub similarity: u8,
    pub distance: u32,
    pub reference_len: u32,
    pub observed_len: u32,
    pub ops: Vec<EditOp>,
    /// Records in feedback card order: substitutions, insertions, deletions.
    pub corrections: Vec<CorrectionTrace>,
    pub error_phonemes: Vec<String>,
    pub notes: Vec<String>,
}

/// A correction record with its viseme resolved for display.
#[derive(Debug, Clone, Serialize)]
pub struct CorrectionTrace {
    pub kind: CorrectionKind,
    pub ref_span: Span,
    pub obs_span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_phonemes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viseme: Option<VisemeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

impl From<&CorrectionRecord> for CorrectionTrace {
    fn from(record: &CorrectionRecord) -> Self {
        let viseme = record.viseme();
        Self {
            kind: record.kind(),
            ref_span: record.ref_span(),
            obs_span: record.obs_span(),
            correct_phonemes: record.correct_phonemes().map(str::to_string),
            viseme,
            asset_key: viseme.map(VisemeId::asset_key),
            description: viseme.map(table::description),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub counts: AggregateCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<MetricDistribution>,
    pub by_kind: KindCounts,
    pub top_visemes: Vec<VisemeCount>,
    pub outliers: Vec<OutlierEntry>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct AggregateCounts {
    pub total: u32,
    pub exact_matches: u32,
    pub with_errors: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricDistribution {
    pub mean: f32,
    pub median: f32,
    pub p10: f32,
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub substitution: u32,
    pub insertion: u32,
    pub deletion: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisemeCount {
    pub viseme: VisemeId,
    pub count: u32,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlierEntry {
    pub id: String,
    pub similarity: u8,
    pub error_count: u32,
}

pub fn compute_utterance_report(
    id: &str,
    reference: &str,
    observed: &str,
    output: &DiscrepancyOutput,
) -> UtteranceReport {
    let mut notes = Vec::new();
    if reference.is_empty() {
        notes.push("empty_reference".to_string());
    }
    if observed.is_empty() {
        notes.push("empty_observed".to_string());
    }

    let unmapped = output
        .corrections
        .error_phonemes
        .iter()
        .flat_map(|segment| viseme::tokenize(segment))
        .filter(|token| !token.mapped)
        .count();
    if unmapped > 0 {
        notes.push(format!("unmapped_phonemes={unmapped}"));
    }

    let alignment = &output.alignment;
    UtteranceReport {
        id: id.to_string(),
        reference: reference.to_string(),
        observed: observed.to_string(),
        similarity: output.similarity,
        distance: to_u32(alignment.distance),
        reference_len: to_u32(alignment.reference_len),
        observed_len: to_u32(alignment.observed_len),
        ops: alignment.ops.clone(),
        corrections: output
            .corrections
            .grouped()
            .into_iter()
            .map(CorrectionTrace::from)
            .collect(),
        error_phonemes: output.corrections.error_phonemes.clone(),
        notes,
    }
}

pub fn aggregate_reports(utterances: &[UtteranceReport]) -> AggregateReport {
    let exact_matches = utterances.iter().filter(|u| u.distance == 0).count();

    let mut by_kind = KindCounts::default();
    let mut viseme_counts: HashMap<VisemeId, u32> = HashMap::new();
    for trace in utterances.iter().flat_map(|u| u.corrections.iter()) {
        match trace.kind {
            CorrectionKind::Substitution => by_kind.substitution += 1,
            CorrectionKind::Insertion => by_kind.insertion += 1,
            CorrectionKind::Deletion => by_kind.deletion += 1,
        }
        if let Some(id) = trace.viseme {
            *viseme_counts.entry(id).or_default() += 1;
        }
    }

    let mut top_visemes: Vec<VisemeCount> = viseme_counts
        .into_iter()
        .map(|(viseme, count)| VisemeCount {
            viseme,
            count,
            description: table::description(viseme),
        })
        .collect();
    top_visemes.sort_by_key(|v| (Reverse(v.count), v.viseme));
    top_visemes.truncate(TOP_VISEME_N);

    let similarities: Vec<f64> = utterances.iter().map(|u| u.similarity as f64).collect();

    AggregateReport {
        counts: AggregateCounts {
            total: to_u32(utterances.len()),
            exact_matches: to_u32(exact_matches),
            with_errors: to_u32(utterances.len() - exact_matches),
        },
        similarity: distribution_or_none(&similarities),
        by_kind,
        top_visemes,
        outliers: build_outliers(utterances, OUTLIER_TOP_N),
    }
}

fn build_outliers(utterances: &[UtteranceReport], top_n: usize) -> Vec<OutlierEntry> {
    let mut ranked: Vec<&UtteranceReport> =
        utterances.iter().filter(|u| u.distance > 0).collect();
    ranked.sort_by(|a, b| a.similarity.cmp(&b.similarity).then_with(|| a.id.cmp(&b.id)));
    ranked
        .into_iter()
        .take(top_n)
        .map(|u| OutlierEntry {
            id: u.id.clone(),
            similarity: u.similarity,
            error_count: to_u32(u.ops.iter().filter(|op| op.kind != OpKind::Equal).count()),
        })
        .collect()
}

/// Similarities are integers in [0, 100], so every statistic is finite.
fn distribution_or_none(values: &[f64]) -> Option<MetricDistribution> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Some(MetricDistribution {
        mean: mean(&sorted) as f32,
        median: median_sorted(&sorted) as f32,
        p10: percentile_sorted(&sorted, 0.10) as f32,
        min: sorted[0] as f32,
        max: sorted[sorted.len() - 1] as f32,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn median_sorted(sorted_values: &[f64]) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    let mid = sorted_values.len() / 2;
    if sorted_values.len() % 2 == 0 {
        (sorted_values[mid - 1] + sorted_values[mid]) / 2.0
    } else {
        sorted_values[mid]
    }
}

fn percentile_sorted(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    if sorted_values.len() == 1 {
        return sorted_values[0];
    }

    let clamped = percentile.clamp(0.0, 1.0);
    let max_index = (sorted_values.len() - 1) as f64;
    let rank = clamped * max_index;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted_values[lower]
    } else {
        let weight = rank - lower as f64;
        sorted_values[lower] * (1.0 - weight) + sorted_values[upper] * weight
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

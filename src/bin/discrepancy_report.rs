use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use viseme_align::{
    aggregate_reports, build_prompt, compute_utterance_report, DiscrepancyEngine,
    DiscrepancyEngineBuilder, DiscrepancyInput, EngineConfig, ErrorSetPolicy, Meta, Report,
    UtteranceReport, SCHEMA_VERSION,
};

#[path = "discrepancy_report/report_writer.rs"]
mod report_writer;

#[derive(Debug, Parser)]
#[command(name = "discrepancy_report")]
#[command(about = "Align expected and observed phoneme strings and report viseme corrections")]
struct Args {
    /// JSON array of cases: `{ "id", "reference", "observed", "sentence"? }`.
    #[arg(
        long,
        env = "VISEME_ALIGN_REPORT_CASES",
        default_value = "test-data/discrepancies/reference.json"
    )]
    cases: PathBuf,
    #[arg(long, env = "VISEME_ALIGN_REPORT_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "VISEME_ALIGN_REPORT_OUT")]
    out: Option<PathBuf>,
    /// Comma-separated case ids to keep.
    #[arg(long, env = "VISEME_ALIGN_REPORT_IDS", value_delimiter = ',')]
    ids: Vec<String>,
    #[arg(long, env = "VISEME_ALIGN_REPORT_LIMIT")]
    limit: Option<usize>,
    #[arg(long, env = "VISEME_ALIGN_REPORT_OFFSET", default_value_t = 0)]
    offset: usize,
    /// Override the configured error set policy.
    #[arg(long, env = "VISEME_ALIGN_REPORT_DEDUP", default_value_t = false)]
    dedup: bool,
    /// Print the feedback-generator prompt of every case to stdout.
    #[arg(long, env = "VISEME_ALIGN_REPORT_PROMPTS", default_value_t = false)]
    print_prompts: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct Case {
    id: String,
    reference: String,
    observed: String,
    #[serde(default)]
    sentence: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        tracing::error!(error = %err, "discrepancy report failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let cases_path = resolve_path(&repo_root, &args.cases);
    let mut cases = load_cases(&cases_path)?;

    if !args.ids.is_empty() {
        let wanted: HashSet<&str> = args.ids.iter().map(String::as_str).collect();
        let known: HashSet<&str> = cases.iter().map(|case| case.id.as_str()).collect();
        let mut missing: Vec<&str> = wanted.difference(&known).copied().collect();
        missing.sort_unstable();
        if !missing.is_empty() {
            tracing::warn!(missing = ?missing, "requested case ids not found");
        }
        cases.retain(|case| wanted.contains(case.id.as_str()));
    }
    if args.offset > 0 {
        cases = cases.into_iter().skip(args.offset).collect();
    }
    if let Some(limit) = args.limit {
        cases.truncate(limit);
    }
    if cases.is_empty() {
        return Err("No cases selected after applying filters/offset/limit.".to_string());
    }

    let engine = build_engine(&repo_root, args.config.as_ref(), args.dedup)?;
    let started = Instant::now();

    let mut utterances: Vec<UtteranceReport> = Vec::with_capacity(cases.len());
    for case in &cases {
        let input = DiscrepancyInput {
            reference: case.reference.clone(),
            observed: case.observed.clone(),
        };
        let output = engine
            .analyze(&input)
            .map_err(|err| format!("{}: analyze() failed: {err}", case.id))?;

        if args.print_prompts {
            let sentence = case.sentence.as_deref().unwrap_or(case.id.as_str());
            println!("# {}", case.id);
            println!(
                "{}\n",
                build_prompt(
                    sentence,
                    &case.reference,
                    &case.observed,
                    &output.corrections.error_phonemes
                )
            );
        }

        utterances.push(compute_utterance_report(
            &case.id,
            &case.reference,
            &case.observed,
            &output,
        ));
    }

    let aggregates = aggregate_reports(&utterances);
    tracing::info!(
        cases = utterances.len(),
        exact_matches = aggregates.counts.exact_matches,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "discrepancy report computed"
    );

    let error_set = match engine.config().error_set {
        ErrorSetPolicy::Preserve => "preserve",
        ErrorSetPolicy::Dedup => "dedup",
    };
    let report = Report {
        schema_version: SCHEMA_VERSION,
        meta: Meta {
            generated_at: Utc::now().to_rfc3339(),
            error_set: error_set.to_string(),
            case_count: utterances.len(),
        },
        utterances,
        aggregates,
    };

    let out_path = resolve_out_path(&repo_root, args.out.as_ref());
    let cards_path = report_writer::write_report(&out_path, &report)?;
    println!("{}", out_path.display());
    println!("{}", cards_path.display());
    Ok(())
}

fn build_engine(
    repo_root: &Path,
    config_path: Option<&PathBuf>,
    dedup: bool,
) -> Result<DiscrepancyEngine, String> {
    let mut config = match config_path {
        Some(path) => {
            let path = resolve_path(repo_root, path);
            require_path_exists(&path, "Missing --config path.")?;
            EngineConfig::load(&path)
                .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if dedup {
        config.error_set = ErrorSetPolicy::Dedup;
    }
    DiscrepancyEngineBuilder::new(config)
        .build()
        .map_err(|err| format!("Failed to build DiscrepancyEngine: {err}"))
}

fn load_cases(path: &Path) -> Result<Vec<Case>, String> {
    require_path_exists(path, "Missing cases JSON.")?;
    let file = File::open(path)
        .map_err(|err| format!("Failed to open cases file '{}': {err}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|err| format!("Failed to parse cases file '{}': {err}", path.display()))
}

fn resolve_out_path(repo_root: &Path, out: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = out {
        return resolve_path(repo_root, path);
    }

    let run_id = Utc::now().format("%Y%m%dT%H%M%SZ");
    repo_root
        .join("target")
        .join("discrepancy_reports")
        .join(format!("discrepancy-report-{run_id}.json"))
}

fn resolve_path(repo_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo_root.join(path)
    }
}

fn require_path_exists(path: &Path, message: &str) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    Err(format!("{message} Missing path: {}", path.display()))
}

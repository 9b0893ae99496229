use crate::cli::CorpusArgs;
use rtmap_corpus::{
    DEFAULT_CONFIG_PATH, Finding, MapperConfig, PipelineOutput, ScannedDirectory, run_pipeline,
    scan_directory,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub const FINDING_SAMPLE_LIMIT: usize = 25;

/// Exit status for unreadable inputs and invalid configuration.
pub const EXIT_FATAL: i32 = 2;

pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn load_config_or_exit(args: &CorpusArgs) -> MapperConfig {
    let (path, explicit) = match &args.config {
        Some(path) => (PathBuf::from(path), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };
    let mut config = MapperConfig::load(&path, explicit).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FATAL);
    });
    if let Some(root) = &args.root {
        config.corpus.root = PathBuf::from(root);
    }
    if let Some(reference) = &args.reference {
        config.corpus.reference_table = PathBuf::from(reference);
    }
    config
}

pub fn pipeline_or_exit(config: &MapperConfig) -> PipelineOutput {
    run_pipeline(config).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FATAL);
    })
}

pub fn scan_or_exit(dir: &Path) -> ScannedDirectory {
    scan_directory(dir).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FATAL);
    })
}

pub fn print_json(payload: &impl Serialize) {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("error: failed to render json: {e}");
            std::process::exit(EXIT_FATAL);
        }
    }
}

pub fn describe_finding(finding: &Finding) -> String {
    format!("[{}] {}: {}", finding.kind, finding.subject, finding.message)
}

/// Text-mode findings block: a count header, at most `limit` described
/// findings, then a trailer naming how many were left out.
pub fn findings_block(findings: &[Finding], limit: usize) -> Vec<String> {
    if findings.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!("  Findings: {}", findings.len())];
    lines.extend(
        findings
            .iter()
            .take(limit)
            .map(|finding| format!("    {}", describe_finding(finding))),
    );
    let hidden = findings.len().saturating_sub(limit);
    if hidden > 0 {
        lines.push(format!("    (+{hidden} not shown, use --json for all)"));
    }
    lines
}

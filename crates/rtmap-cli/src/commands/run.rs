use crate::cli::CorpusArgs;
use crate::support::{
    EXIT_FATAL, FINDING_SAMPLE_LIMIT, findings_block, load_config_or_exit, pipeline_or_exit,
    print_json,
};
use rtmap_corpus::{finding_classes, has_errors};
use rtmap_store::{snapshot_digest, write_snapshot, write_table_csv};
use serde_json::json;

const RUN_KIND: &str = "rtmap.run.v1";

pub fn run(
    corpus: CorpusArgs,
    out_json: Option<String>,
    out_csv: Option<String>,
    json_output: bool,
) {
    let config = load_config_or_exit(&corpus);
    let output = pipeline_or_exit(&config);

    let digest = snapshot_digest(&output.joined).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FATAL);
    });
    if let Some(path) = &out_json {
        write_snapshot(path, &output).unwrap_or_else(|e| {
            eprintln!("error: failed to write snapshot {path}: {e}");
            std::process::exit(EXIT_FATAL);
        });
    }
    if let Some(path) = &out_csv {
        write_table_csv(path, &output.table).unwrap_or_else(|e| {
            eprintln!("error: failed to write table {path}: {e}");
            std::process::exit(EXIT_FATAL);
        });
    }

    let failed = has_errors(&output.findings);
    let result = if failed { "rejected" } else { "accepted" };

    if json_output {
        let payload = json!({
            "schema": 1,
            "runKind": RUN_KIND,
            "result": result,
            "digest": digest,
            "summary": output.summary,
            "rowCount": output.table.len(),
            "testCount": output.dependencies.tests.len(),
            "findingClasses": finding_classes(&output.findings),
            "findings": output.findings,
            "table": output.table,
            "outJson": out_json,
            "outCsv": out_csv,
        });
        print_json(&payload);
    } else {
        println!("[rtmap] run {result}");
        println!("  Reference: {}", config.corpus.reference_table.display());
        println!("  Corpus root: {}", config.corpus.root.display());
        println!(
            "  Combos: {}  Categories: {}  Tests: {}",
            output.summary.combo_count,
            output.summary.category_count,
            output.summary.unique_test_count
        );
        println!("  Table rows: {}", output.table.len());
        println!("  Digest: {digest}");
        if let Some(path) = &out_json {
            println!("  Snapshot: {path}");
        }
        if let Some(path) = &out_csv {
            println!("  Table CSV: {path}");
        }
        for line in findings_block(&output.findings, FINDING_SAMPLE_LIMIT) {
            println!("{line}");
        }
    }

    if failed {
        std::process::exit(1);
    }
}

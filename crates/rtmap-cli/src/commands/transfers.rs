use crate::cli::CorpusArgs;
use crate::support::{EXIT_FATAL, load_config_or_exit, print_json, scan_or_exit};
use rtmap_corpus::{ModelConfTransfers, parse_model_confs};
use serde_json::json;
use std::collections::BTreeMap;

pub fn run(corpus: CorpusArgs, file: Option<String>, json_output: bool) {
    let config = load_config_or_exit(&corpus);
    let dir = config.corpus.model_conf_path();
    let scanned = scan_or_exit(&dir);
    let scan = parse_model_confs(&scanned, &config.transfer.source_prefixes);

    let files: BTreeMap<&String, &ModelConfTransfers> = match &file {
        Some(name) => match scan.files.get_key_value(name) {
            Some(entry) => BTreeMap::from([entry]),
            None => {
                eprintln!("error: model-conf file not found in {}: {name}", dir.display());
                std::process::exit(EXIT_FATAL);
            }
        },
        None => scan.files.iter().collect(),
    };

    if json_output {
        let payload = json!({
            "directory": dir.display().to_string(),
            "files": files,
            "rootFolders": scan.root_folders,
            "findings": scan.findings,
        });
        print_json(&payload);
        return;
    }

    println!("[rtmap] transfers {}", dir.display());
    for (name, transfers) in &files {
        println!("  {name} ({} rules)", transfers.statement_count());
        for rule in &transfers.rules {
            println!(
                "    - {} {} -> {}",
                rule.operation.verb(),
                rule.source,
                rule.destination
            );
        }
    }
    let roots = &scan.root_folders;
    println!(
        "  Root folders: [{}] {{{}}} bare: {} parent-dir: {}",
        roots.bracket_roots.iter().cloned().collect::<Vec<_>>().join(", "),
        roots.brace_roots.iter().cloned().collect::<Vec<_>>().join(", "),
        roots.bare_roots.len(),
        if roots.uses_parent_dir { "yes" } else { "no" }
    );
    if !scan.findings.is_empty() {
        println!("  Ambiguous statements: {}", scan.findings.len());
    }
}

use crate::cli::{CorpusArgs, VarsKindArg};
use crate::support::{load_config_or_exit, print_json, scan_or_exit};
use rtmap_corpus::{model_conf_globals, namelist_globals, parse_namelists};
use serde_json::json;

pub fn run(corpus: CorpusArgs, kind: VarsKindArg, json_output: bool) {
    let config = load_config_or_exit(&corpus);
    let (dir, variables) = match kind {
        VarsKindArg::ModelConf => {
            let dir = config.corpus.model_conf_path();
            let scanned = scan_or_exit(&dir);
            (dir, model_conf_globals(&scanned))
        }
        VarsKindArg::Namelist => {
            let dir = config.corpus.namelist_path();
            let scanned = scan_or_exit(&dir);
            let refs = parse_namelists(&scanned, &config.namelist.dataset_extensions);
            (dir, namelist_globals(&refs))
        }
    };

    if json_output {
        let payload = json!({
            "kind": kind.as_str(),
            "directory": dir.display().to_string(),
            "variables": variables,
        });
        print_json(&payload);
        return;
    }

    println!("[rtmap] vars --kind {} {}", kind.as_str(), dir.display());
    for name in &variables {
        println!("  - {name}");
    }
}

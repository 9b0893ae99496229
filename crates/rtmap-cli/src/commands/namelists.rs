use crate::cli::CorpusArgs;
use crate::support::{EXIT_FATAL, load_config_or_exit, print_json, scan_or_exit};
use rtmap_corpus::{NamelistRefs, parse_namelists};

pub fn run(corpus: CorpusArgs, file: Option<String>, json_output: bool) {
    let config = load_config_or_exit(&corpus);
    let dir = config.corpus.namelist_path();
    let scanned = scan_or_exit(&dir);
    let mut refs = parse_namelists(&scanned, &config.namelist.dataset_extensions);

    if let Some(name) = &file {
        let Some(datasets) = refs.remove(name) else {
            eprintln!("error: namelist file not found in {}: {name}", dir.display());
            std::process::exit(EXIT_FATAL);
        };
        refs = NamelistRefs::from([(name.clone(), datasets)]);
    }

    if json_output {
        print_json(&refs);
        return;
    }

    println!("[rtmap] namelists {}", dir.display());
    for (name, datasets) in &refs {
        println!("  {name} ({} datasets)", datasets.len());
        for dataset in datasets {
            println!("    - {dataset}");
        }
    }
}

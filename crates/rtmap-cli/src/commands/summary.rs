use crate::cli::CorpusArgs;
use crate::support::{EXIT_FATAL, load_config_or_exit, print_json};
use rtmap_corpus::{TestHierarchy, read_reference_table};

pub fn run(corpus: CorpusArgs, json_output: bool) {
    let config = load_config_or_exit(&corpus);
    let reference = read_reference_table(&config.corpus.reference_table).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FATAL);
    });
    let hierarchy = TestHierarchy::build(&reference.rows);
    let summary = hierarchy.summary();

    if json_output {
        print_json(&summary);
        return;
    }

    println!(
        "[rtmap] summary {}",
        config.corpus.reference_table.display()
    );
    println!("  App/physics combos: {}", summary.combo_count);
    println!("  Test categories: {}", summary.category_count);
    println!("  Test entries: {}", summary.test_count);
    println!("  Unique tests: {}", summary.unique_test_count);
    for combo in hierarchy.combos() {
        println!("    - {} / {}", combo.app, combo.physics_suite);
    }
    if !reference.findings.is_empty() {
        println!("  Malformed rows: {}", reference.findings.len());
    }
}

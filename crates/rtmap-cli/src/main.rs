//! rtmap CLI: the `rtmap` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_tracing(cli.command.corpus_args().verbose);

    match cli.command {
        Commands::Run {
            corpus,
            out_json,
            out_csv,
            json,
        } => commands::run::run(corpus, out_json, out_csv, json),

        Commands::Summary { corpus, json } => commands::summary::run(corpus, json),

        Commands::Transfers { corpus, file, json } => commands::transfers::run(corpus, file, json),

        Commands::Namelists { corpus, file, json } => commands::namelists::run(corpus, file, json),

        Commands::Vars { corpus, kind, json } => commands::vars::run(corpus, kind, json),
    }
}

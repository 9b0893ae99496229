use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "rtmap",
    about = "rtmap: map regression tests to the config files and datasets they depend on",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Clone, Debug)]
pub struct CorpusArgs {
    /// Path to rtmap TOML config (missing default file means built-in defaults)
    #[arg(long)]
    pub config: Option<String>,

    /// Corpus root; overrides `corpus.root`
    #[arg(long)]
    pub root: Option<String>,

    /// Reference CSV of app/physics-suite/test combinations; overrides `corpus.reference_table`
    #[arg(long)]
    pub reference: Option<String>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline and report the joined table
    Run {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Write the full pipeline output as a JSON snapshot
        #[arg(long)]
        out_json: Option<String>,

        /// Write the flattened table as CSV
        #[arg(long)]
        out_csv: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize the reference table hierarchy
    Summary {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List transfer rules per model-conf file
    Transfers {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Restrict output to one model-conf file name
        #[arg(long)]
        file: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List dataset filenames per namelist file
    Namelists {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Restrict output to one namelist file name
        #[arg(long)]
        file: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List global variables referenced across a config directory
    Vars {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Which config directory to scan
        #[arg(long, value_enum, default_value = "model-conf")]
        kind: VarsKindArg,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    pub fn corpus_args(&self) -> &CorpusArgs {
        match self {
            Self::Run { corpus, .. }
            | Self::Summary { corpus, .. }
            | Self::Transfers { corpus, .. }
            | Self::Namelists { corpus, .. }
            | Self::Vars { corpus, .. } => corpus,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum VarsKindArg {
    #[value(name = "model-conf")]
    ModelConf,
    #[value(name = "namelist")]
    Namelist,
}

impl VarsKindArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModelConf => "model-conf",
            Self::Namelist => "namelist",
        }
    }
}

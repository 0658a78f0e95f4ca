use std::path::PathBuf;

use clap::Parser;

use ilgen_cli::cli;
use ilgen_cli::logger;
use ilgen_dsl::mnemonic::DEFAULT_LITERAL_PREFIX;

#[derive(Parser, Debug)]
#[command(name = "ilgen", about = "Interlock ladder generator")]
struct Args {
    /// Turn on verbose logging. Repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write log records to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(clap::Subcommand, Debug)]
enum Action {
    /// Generate the mnemonic rows for a condition model.
    Generate {
        /// The condition model (JSON).
        model: PathBuf,

        /// Generation options (JSON). Missing fields keep their defaults.
        #[arg(long)]
        options: Option<PathBuf>,

        /// Write the rows to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate mnemonic rows (JSON files or directories of them).
    Check {
        files: Vec<PathBuf>,

        /// Prefix that marks a literal operand.
        #[arg(long, default_value = DEFAULT_LITERAL_PREFIX)]
        literal_prefix: String,
    },
    /// Print the version number.
    Version,
}

pub fn main() -> Result<(), String> {
    let args = Args::parse();

    logger::configure(args.verbose, args.log_file)?;

    match args.action {
        Action::Generate {
            model,
            options,
            output,
        } => cli::generate(&model, options.as_deref(), output.as_deref(), false),
        Action::Check {
            files,
            literal_prefix,
        } => cli::check(files, &literal_prefix, false),
        Action::Version => {
            println!("ilgen version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

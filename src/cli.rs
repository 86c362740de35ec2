use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tspmo_lang::{config::DEFAULT_MAX_CALL_DEPTH, run_file, Config};

#[derive(Parser)]
#[command(name = "tspmo")]
#[command(version, about = "Run TSPMO programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program file
    Run {
        /// Program to run
        file: PathBuf,

        /// Standard library directory (defaults to `stdlib/` beside the
        /// executable, else the stdlib of the checkout it was built from)
        #[arg(long, env = "TSPMO_STDLIB")]
        stdlib: Option<PathBuf>,

        /// User library directory (defaults to `userlib` beside the program)
        #[arg(long, env = "TSPMO_USERLIB")]
        userlib: Option<PathBuf>,

        /// Deepest allowed chain of nested function calls
        #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
        max_call_depth: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            file,
            stdlib,
            userlib,
            max_call_depth,
        } => {
            let mut config = Config::for_program(&file).with_max_call_depth(max_call_depth);
            if let Some(dir) = stdlib {
                config = config.with_stdlib_dir(dir);
            }
            if let Some(dir) = userlib {
                config = config.with_userlib_dir(dir);
            }
            run_file(&file, &config)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

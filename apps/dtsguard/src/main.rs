use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use dtsguard_public_api::Config;
use log::{debug, info};
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "dtsguard")]
#[command(about = "Guards the public API of TypeScript declaration files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render, write or verify the public API of declaration files
    PublicApi(Config),
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());
    let mut stderr = std::io::stderr();

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::PublicApi(cfg) => {
            let num_threads = rayon::current_num_threads();
            info!("Running public API check on {} entries (using {} threads)", cfg.entries.len(), num_threads);
            debug!("Config: root={:?}, out_dir={:?}, verify_dir={:?}", cfg.root, cfg.out_dir, cfg.verify_dir);

            let json = cfg.json;
            let writing = cfg.out_dir.is_some();
            let verifying = cfg.verify_dir.is_some();

            let result = dtsguard_public_api::run_public_api_check(cfg)?;
            debug!("Rendered {} entries", result.entries.len());

            let elapsed_ms = start.elapsed().as_millis();

            if json {
                dtsguard_public_api::print_json(&mut stdout, &result)?;
            } else {
                dtsguard_public_api::print_warnings(&mut stderr, &result)?;
                if writing {
                    dtsguard_public_api::print_written(&mut stdout, &result)?;
                } else if verifying {
                    dtsguard_public_api::print_verification(&mut stdout, &result)?;
                } else {
                    dtsguard_public_api::print_reports(&mut stdout, &result)?;
                }
            }

            if writing || verifying {
                writeln!(
                    stdout,
                    "\n{} Finished in {}ms on {} entries (using {} threads).",
                    "●".bright_blue(),
                    elapsed_ms.to_string().cyan(),
                    result.entries.len().to_string().cyan(),
                    num_threads.to_string().cyan()
                )?;
            }
            stdout.flush()?;

            if result.failed_verifications().next().is_some() {
                // Non-zero exit to fail CI
                std::process::exit(1);
            }

            Ok(())
        }
    }
}

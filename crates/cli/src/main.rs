mod seed;
mod serve;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use frontdesk_storage::conformance::run_conformance_suite;
use frontdesk_storage::MemoryStorage;

/// Hotel front-desk booking service.
#[derive(Parser)]
#[command(name = "frontdesk", version, about = "Hotel front-desk booking service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the booking HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
        /// Load demo bookings into the store at startup
        #[arg(long)]
        seed: bool,
        /// Run against the pre-migration schema profile (legacy payment
        /// labels, no actual-event timestamp columns)
        #[arg(long)]
        legacy_schema: bool,
        /// Path to TLS certificate PEM file (requires --tls-key)
        #[arg(long)]
        tls_cert: Option<PathBuf>,
        /// Path to TLS private key PEM file (requires --tls-cert)
        #[arg(long)]
        tls_key: Option<PathBuf>,
    },

    /// Run the storage conformance suite against the in-memory backend
    Conformance,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            seed,
            legacy_schema,
            tls_cert,
            tls_key,
        } => {
            // Validate TLS flags: both must be provided or neither
            if tls_cert.is_some() != tls_key.is_some() {
                eprintln!("error: --tls-cert and --tls-key must both be provided");
                process::exit(1);
            }
            let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
            if let Err(e) = rt.block_on(serve::start_server(
                port,
                seed,
                legacy_schema,
                tls_cert,
                tls_key,
            )) {
                eprintln!("Server error: {}", e);
                process::exit(1);
            }
        }
        Commands::Conformance => {
            cmd_conformance();
        }
    }
}

fn cmd_conformance() {
    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    let report = rt.block_on(run_conformance_suite(|profile| async move {
        MemoryStorage::with_profile(profile)
    }));
    print!("{}", report);
    if report.failed > 0 {
        process::exit(1);
    }
}

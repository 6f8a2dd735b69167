use clap::Parser;
use sheetreader::{reader::failure_message, Cli, ReaderConfig, SheetReader};
use std::io;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Exit status for bad flags, env or config file.
const EXIT_CONFIG: u8 = 2;

fn main() -> ExitCode {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,sheetreader=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    // ─── 2) load config ──────────────────────────────────────────────
    let cli = Cli::parse();
    let config = match ReaderConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: invalid configuration: {e:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    info!(
        credentials = %config.credential_path.display(),
        worksheet = %config.worksheet_title,
        "startup"
    );

    // ─── 3) read & print ─────────────────────────────────────────────
    let reader = SheetReader::new(config);
    let mut out = io::stdout().lock();
    match reader
        .authenticate()
        .and_then(|session| reader.run_to(&session, &mut out))
    {
        Ok(report) => {
            info!(values = report.values.len(), "all done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            debug!(kind = e.kind().as_str(), "{:#}", e);
            eprintln!("{}", failure_message(&e, reader.config()));
            e.exit_code()
        }
    }
}

mod config;
mod session;

use anyhow::{Context, Result};
use astrace_lookup::{IpInfoClient, DEFAULT_BASE_URL};
use astrace_render::TableRenderer;
use astrace_trace::{LineSource, ProcessLines, ReaderLines, TraceParser};
use clap::Parser;
use config::Config;
use session::{Session, SessionOutcome};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "astrace",
    version,
    about = "Trace the route to a host and show the autonomous system and location of every hop"
)]
pub struct Cli {
    /// Destination host name or address.
    pub destination: String,

    /// Marker vocabulary of the tracer output (ru, en).
    #[arg(long, default_value = "ru")]
    pub locale: String,

    /// Codepage label overriding the locale's default (e.g. cp866, utf-8).
    #[arg(long)]
    pub codepage: Option<String>,

    /// Tracer program to run.
    #[arg(long, default_value = "tracert")]
    pub tracer: String,

    /// Parse a saved tracer transcript instead of running the tracer.
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Base URL of the lookup service.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub lookup_url: String,

    /// Timeout per lookup request in milliseconds.
    #[arg(long, default_value_t = 5000)]
    pub timeout_ms: u64,

    /// Number of lookups allowed in flight at once.
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Enable debug logging on stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(outcome) => ExitCode::from(outcome.termination.exit_code()),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<SessionOutcome> {
    let config = Config::from_cli(cli)?;

    let source: Box<dyn LineSource> = match &config.replay {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open transcript {:?}", path))?;
            Box::new(ReaderLines::new(BufReader::new(file), config.encoding))
        }
        None => Box::new(ProcessLines::spawn(
            &config.destination,
            &config.tracer,
            config.encoding,
        )?),
    };

    let lookup = IpInfoClient::new(&config.lookup_url, config.lookup_timeout)
        .context("failed to set up lookup client")?;
    let parser = TraceParser::new(source, config.locale.markers.clone());
    let session = Session::new(
        config.concurrency,
        config.locale.markers.completion_notice.as_str(),
    );

    let mut renderer = TableRenderer::new(io::stdout());
    let outcome = session.run(parser, &lookup, &mut renderer, &mut io::stdout())?;

    info!(
        destination = %config.destination,
        hops = outcome.hops,
        termination = ?outcome.termination,
        "trace finished"
    );
    Ok(outcome)
}

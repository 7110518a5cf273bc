use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use signalman::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "signalman")]
#[command(
    about = "Poll an endpoint until a response condition is met or a timeout elapses",
    long_about = None
)]
#[command(version = concat!("(version ", env!("CARGO_PKG_VERSION"), ")"))]
struct Cli {
    /// Set timeout for signalman to run in minutes
    #[arg(long, value_name = "MINUTES")]
    timeout: u64,

    /// Endpoint to poll
    #[arg(long)]
    endpoint: String,

    /// Port to poll (ignored when the endpoint already has one)
    #[arg(long)]
    port: Option<u16>,

    /// Return type to look for
    #[arg(long = "r-type", value_enum)]
    r_type: ConditionKind,

    /// Return value to look for (key:value for json)
    #[arg(long = "r-value")]
    r_value: String,

    /// Request headers, e.g. content-type:application/json
    #[arg(long, num_args = 1..)]
    headers: Vec<String>,

    /// Poll with https enabled
    #[arg(long)]
    ssl: bool,

    /// Log raw requests and responses
    #[arg(long)]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        "signalman=debug"
    } else {
        "signalman=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.debug);

    match run(cli).await {
        Ok(outcome) => {
            if !outcome.is_success() {
                println!("signalman timed out");
            }
            ExitCode::from(outcome.exit_code())
        }
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "signalman failed");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<RunOutcome> {
    let condition = SuccessCondition::parse(cli.r_type, &cli.r_value)
        .context("invalid --r-value")?;
    let config = PollConfig::from_timeout_minutes(cli.timeout)
        .context("invalid --timeout")?
        .with_debug(cli.debug);
    let headers = parse_headers(&cli.headers);
    let target = EndpointTarget::build(&cli.endpoint, cli.port, cli.ssl)
        .context("invalid --endpoint")?
        .with_headers(headers);

    let poller = Poller::new(config)?;
    let outcome = poller.run(&target, &condition).await;

    if cli.debug {
        tracing::debug!(
            "Run report: {}",
            serde_json::to_string(&outcome).unwrap_or_default()
        );
    }

    Ok(outcome)
}

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use serde_json::json;

use bot_launcher::config::loader::apply_env_overrides;
use bot_launcher::config::ServerConfig;
use bot_launcher::health::{health_url, ProbeOutcome};
use bot_launcher::LauncherConfig;

#[derive(Parser)]
#[command(name = "launcher-probe")]
#[command(about = "One-shot readiness probe for the bot's web service", long_about = None)]
struct Cli {
    /// Service host (defaults to $SERVER_HOST, then 127.0.0.1)
    #[arg(long)]
    host: Option<String>,

    /// Service port (defaults to $SERVER_PORT, then 8000)
    #[arg(long)]
    port: Option<u16>,

    /// Health path, optionally with a query string
    #[arg(long, default_value = "/")]
    path: String,

    /// Request deadline in milliseconds
    #[arg(long, default_value_t = 2000)]
    timeout_ms: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let server = match resolve_server(&cli) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("launcher-probe: {}", e);
            return ExitCode::from(2);
        }
    };

    let url = match health_url(&server.host, server.port, &cli.path) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("launcher-probe: {}", e);
            return ExitCode::from(2);
        }
    };

    let outcome = probe(url.as_str(), Duration::from_millis(cli.timeout_ms)).await;
    let report = json!({
        "url": url.as_str(),
        "status": outcome.status().map(|s| s.as_u16()),
        "ready": outcome.is_ready(),
        "error": match &outcome {
            ProbeOutcome::Ready(_) => None,
            other => Some(other.to_string()),
        },
    });

    match serde_json::to_string_pretty(&report) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("launcher-probe: {}", e),
    }

    if outcome.is_ready() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn resolve_server(cli: &Cli) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = LauncherConfig::default();
    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;

    let mut server = config.server;
    if let Some(host) = &cli.host {
        server.host = host.clone();
    }
    if let Some(port) = cli.port {
        server.port = port;
    }
    Ok(server)
}

async fn probe(url: &str, timeout: Duration) -> ProbeOutcome {
    let client = match reqwest::Client::builder()
        .timeout(timeout)
        .no_proxy()
        // A 3xx is itself the answer, as in the orchestrator's probe.
        .redirect(reqwest::redirect::Policy::none())
        .build()
    {
        Ok(client) => client,
        Err(e) => return ProbeOutcome::Transport(e.to_string()),
    };

    match client.get(url).send().await {
        Ok(res) => ProbeOutcome::from_status(res.status()),
        Err(e) if e.is_timeout() => ProbeOutcome::TimedOut,
        Err(e) => ProbeOutcome::Transport(e.to_string()),
    }
}

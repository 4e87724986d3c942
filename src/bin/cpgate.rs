//! cpgate - Control Point gate check CLI
//!
//! Pre-merge gate client for CI pipelines and interactive use. Checks the
//! gate for a change scope, walks the operator through arbitration of any
//! conflicts, and terminates with the fixed exit-code contract.

use clap::Parser;
use control_point::claim::models::ChangeScope;
use control_point::cli::{ExitCode, GateClient, GateSession, SessionOptions, TransportError};
use control_point::gate::arbitration::{Arbitration, ArbitrationOutcome};
use control_point::gate::evaluator::GateResult;
use std::io;
use url::Url;

const DEFAULT_GATE_URL: &str = "http://localhost:8000/gate/check";

#[derive(Parser, Debug)]
#[command(name = "cpgate", version, about = "Control Point gate check")]
struct Cli {
    /// Repository the change touches
    #[arg(long)]
    repo: Option<String>,

    /// Path the change touches
    #[arg(long)]
    path: Option<String>,

    /// Subsystem the change touches
    #[arg(long)]
    subsystem: Option<String>,

    /// API the change touches
    #[arg(long)]
    api: Option<String>,

    /// Force a proceed exit regardless of the computed verdict
    #[arg(long)]
    dry_run: bool,

    /// Emit one machine-readable line and never prompt
    #[arg(long)]
    machine: bool,

    /// Gate check endpoint
    #[arg(long, default_value = DEFAULT_GATE_URL)]
    url: String,
}

/// Blocking HTTP client for the gate service.
struct HttpGateClient {
    http: reqwest::blocking::Client,
    check_url: Url,
    arbitrate_url: Url,
}

impl HttpGateClient {
    fn new(url: &str) -> anyhow::Result<Self> {
        let check_url = Url::parse(url)?;
        // The arbitration endpoint lives next to the check endpoint.
        let arbitrate_url = Url::parse(&check_url.as_str().replace("/gate/check", "/gate/arbitrate"))?;
        Ok(Self {
            http: reqwest::blocking::Client::new(),
            check_url,
            arbitrate_url,
        })
    }

    fn post_json<Req: serde::Serialize, Resp: serde::de::DeserializeOwned>(
        &self,
        url: &Url,
        payload: &Req,
    ) -> Result<Resp, TransportError> {
        let response = self
            .http
            .post(url.clone())
            .json(payload)
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        response
            .json()
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

impl GateClient for HttpGateClient {
    fn check(&self, scope: &ChangeScope) -> Result<GateResult, TransportError> {
        self.post_json(&self.check_url, scope)
    }

    fn arbitrate(&self, arbitration: &Arbitration) -> Result<ArbitrationOutcome, TransportError> {
        self.post_json(&self.arbitrate_url, arbitration)
    }
}

fn main() {
    let cli = Cli::parse();

    let scope = ChangeScope {
        repo: cli.repo,
        path: cli.path,
        subsystem: cli.subsystem,
        api: cli.api,
    };

    let client = match HttpGateClient::new(&cli.url) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("ERROR: invalid gate url: {e}");
            std::process::exit(ExitCode::HardReject.code());
        }
    };

    let options = SessionOptions {
        scope,
        dry_run: cli.dry_run,
        machine: cli.machine,
    };
    let session = GateSession::new(&client, options);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    let mut err = io::stderr();
    let code = session.run(&mut input, &mut out, &mut err);
    std::process::exit(code.code());
}

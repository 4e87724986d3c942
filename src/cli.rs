//! CLI gate session
//!
//! The client-side state machine behind `cpgate`: check the gate, resolve
//! conflicts interactively, re-check, and terminate with a fixed exit code.
//! The transport lives behind [`GateClient`] so the loop is testable without
//! a network.

use crate::claim::models::{ChangeScope, ClaimSeverity};
use crate::gate::arbitration::{Arbitration, ArbitrationOutcome};
use crate::gate::evaluator::{GateResult, CONTRACT_VERSION};
use std::io::{BufRead, Write};
use thiserror::Error;

/// Terminal exit codes. A stable, versioned contract consumed by CI: any
/// change in meaning requires a contract_version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Proceed,
    WarningsOnly,
    ConflictArbitrationRequired,
    HardReject,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Proceed => 0,
            ExitCode::WarningsOnly => 10,
            ExitCode::ConflictArbitrationRequired => 20,
            ExitCode::HardReject => 30,
        }
    }

    /// The full enumeration as a name -> code map, for contract discovery.
    pub fn table() -> serde_json::Value {
        serde_json::json!({
            "proceed": ExitCode::Proceed.code(),
            "warnings_only": ExitCode::WarningsOnly.code(),
            "conflict_arbitration_required": ExitCode::ConflictArbitrationRequired.code(),
            "hard_reject": ExitCode::HardReject.code(),
        })
    }
}

/// Transport failures are fatal to the current invocation; the session never
/// retries (repeated `arbitrate` submission is not side-effect-free).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("gate request failed: {0}")]
    Request(String),
    #[error("gate response could not be decoded: {0}")]
    Decode(String),
}

/// The session's view of the gate service.
pub trait GateClient {
    fn check(&self, scope: &ChangeScope) -> Result<GateResult, TransportError>;
    fn arbitrate(&self, arbitration: &Arbitration) -> Result<ArbitrationOutcome, TransportError>;
}

/// Session configuration from the command line.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub scope: ChangeScope,
    pub dry_run: bool,
    pub machine: bool,
}

/// One interactive (or machine) gate session.
pub struct GateSession<'a, C: GateClient> {
    client: &'a C,
    options: SessionOptions,
}

impl<'a, C: GateClient> GateSession<'a, C> {
    pub fn new(client: &'a C, options: SessionOptions) -> Self {
        Self { client, options }
    }

    /// Drive the session to a terminal exit code.
    ///
    /// Prompts and results go to `out`; diagnostics to `err`. In machine
    /// mode exactly one structured line is written to `out` and nothing is
    /// ever prompted.
    pub fn run(
        &self,
        input: &mut impl BufRead,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> ExitCode {
        if self.options.scope.is_empty() {
            let _ = writeln!(err, "ERROR: At least one scope argument is required.");
            return ExitCode::HardReject;
        }

        let mut result = match self.checked_round_trip(&mut *err) {
            Ok(result) => result,
            Err(code) => return code,
        };

        if self.options.machine {
            // Single evaluation, one structured line, no arbitration loop.
            match serde_json::to_string(&result) {
                Ok(line) => {
                    let _ = writeln!(out, "{line}");
                }
                Err(e) => {
                    let _ = writeln!(err, "ERROR: failed to encode result: {e}");
                    return ExitCode::HardReject;
                }
            }
            return self.finalize(&result, err);
        }

        self.print_result(&result, &mut *out);

        // A dry run never arbitrates: the verdict is overridden regardless,
        // so prompting would only stall pipelines.
        if self.options.dry_run {
            return self.finalize(&result, err);
        }

        // Arbitration loop: resolve every conflict in the current result,
        // then ask the gate again. The server holds no pending state, so
        // each retry is a full recomputation.
        while !result.passed && !result.conflicts.is_empty() {
            for conflict in &result.conflicts {
                let _ = writeln!(out, "\nConflict {}:", conflict.conflict_id);
                let _ = writeln!(out, "Question: {}", conflict.question);
                for choice in &conflict.choices {
                    let _ = writeln!(
                        out,
                        "  [{}] {} - {}",
                        choice.key.to_uppercase(),
                        choice.label,
                        choice.effect
                    );
                }

                let keys: Vec<&str> = conflict.choices.iter().map(|c| c.key.as_str()).collect();
                let decision = match Self::prompt_choice(&keys, &mut *input, &mut *out) {
                    Some(decision) => decision,
                    None => {
                        let _ = writeln!(err, "ERROR: input closed during arbitration.");
                        return ExitCode::HardReject;
                    }
                };

                let arbitration = Arbitration {
                    conflict_id: conflict.conflict_id.clone(),
                    decision,
                    justification: "Arbitrated via cpgate.".to_string(),
                    scope: self.options.scope.clone(),
                };
                match self.client.arbitrate(&arbitration) {
                    Ok(ArbitrationOutcome::Accepted { .. }) => {}
                    Ok(ArbitrationOutcome::Rejected { reason }) => {
                        let _ = writeln!(err, "Arbitration failed: {reason}");
                        return ExitCode::HardReject;
                    }
                    Err(e) => {
                        let _ = writeln!(err, "ERROR: {e}");
                        return ExitCode::HardReject;
                    }
                }
            }

            // Fresh round trip after submitting every arbitration.
            result = match self.checked_round_trip(&mut *err) {
                Ok(result) => result,
                Err(code) => return code,
            };
            self.print_result(&result, &mut *out);
        }

        self.finalize(&result, err)
    }

    /// One gate check with the contract-version guard applied before any
    /// other interpretation of the payload.
    fn checked_round_trip(&self, err: &mut impl Write) -> Result<GateResult, ExitCode> {
        let result = match self.client.check(&self.options.scope) {
            Ok(result) => result,
            Err(e) => {
                let _ = writeln!(err, "ERROR: {e}");
                return Err(ExitCode::HardReject);
            }
        };
        if result.contract_version != CONTRACT_VERSION {
            let _ = writeln!(
                err,
                "ERROR: Contract version mismatch (expected {}, got {})",
                CONTRACT_VERSION, result.contract_version
            );
            return Err(ExitCode::HardReject);
        }
        Ok(result)
    }

    fn print_result(&self, result: &GateResult, out: &mut impl Write) {
        if let Ok(pretty) = serde_json::to_string_pretty(result) {
            let _ = writeln!(out, "{pretty}");
        }
    }

    /// Prompt until the answer is one of the declared choice keys. Invalid
    /// input is re-prompted, never defaulted. Returns None on EOF.
    fn prompt_choice(
        keys: &[&str],
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> Option<String> {
        loop {
            let _ = write!(out, "Enter choice ({}): ", keys.join("/"));
            let _ = out.flush();
            let mut line = String::new();
            match input.read_line(&mut line) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {
                    let answer = line.trim().to_lowercase();
                    if keys.contains(&answer.as_str()) {
                        return Some(answer);
                    }
                }
            }
        }
    }

    fn finalize(&self, result: &GateResult, err: &mut impl Write) -> ExitCode {
        if self.options.dry_run {
            let _ = writeln!(err, "dry-run: overriding computed verdict, proceeding.");
            return ExitCode::Proceed;
        }
        derive_exit(result)
    }
}

/// Map a gate result to the exit-code contract.
///
/// Conflicts outrank blocking claims; a passing result with warn-severity
/// claims in scope reports warnings_only.
pub fn derive_exit(result: &GateResult) -> ExitCode {
    if !result.passed {
        if !result.conflicts.is_empty() {
            return ExitCode::ConflictArbitrationRequired;
        }
        return ExitCode::HardReject;
    }
    if result
        .claims
        .iter()
        .any(|c| c.severity == ClaimSeverity::Warn)
    {
        return ExitCode::WarningsOnly;
    }
    ExitCode::Proceed
}

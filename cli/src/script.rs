//! Scripted simulation: a JSON list of timed actions run through the host.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use sova_protocol::{Action, Outcome, Protocol, ProtocolSummary};
use sova_types::{Address, EventRecord, Timestamp};
use std::path::Path;

/// One scripted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Seconds since the epoch at which the step executes.
    pub at: u64,
    pub caller: Address,
    pub action: Action,
    /// The step is expected to fail; a success aborts the run.
    #[serde(default)]
    pub expect_error: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub at: u64,
    pub caller: Address,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SimulationReport {
    pub steps: Vec<StepReport>,
    pub events: Vec<EventRecord>,
    pub summary: ProtocolSummary,
}

pub fn load_script(path: &Path) -> anyhow::Result<Vec<Step>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing script {}", path.display()))
}

/// Run every step in order, stopping at the first unexpected result.
pub fn run(protocol: &mut Protocol, steps: Vec<Step>) -> anyhow::Result<SimulationReport> {
    let mut reports = Vec::with_capacity(steps.len());
    let mut last_at = 0;
    for (index, step) in steps.into_iter().enumerate() {
        if step.at < last_at {
            bail!("step {index} runs at {} before the previous step at {last_at}", step.at);
        }
        last_at = step.at;
        let name = step.action.name();

        match protocol.execute(&step.caller, Timestamp::new(step.at), step.action) {
            Ok(outcome) if step.expect_error => {
                bail!("step {index} ({name}) was expected to fail but returned {outcome:?}");
            }
            Ok(outcome) => {
                tracing::info!(index, at = step.at, caller = %step.caller, action = name, ?outcome, "step ok");
                reports.push(StepReport {
                    index,
                    at: step.at,
                    caller: step.caller,
                    action: name,
                    outcome: Some(outcome),
                    error: None,
                });
            }
            Err(e) if step.expect_error => {
                tracing::info!(index, at = step.at, caller = %step.caller, action = name, error = %e, "step failed as expected");
                reports.push(StepReport {
                    index,
                    at: step.at,
                    caller: step.caller,
                    action: name,
                    outcome: None,
                    error: Some(e.to_string()),
                });
            }
            Err(e) => {
                return Err(e).with_context(|| format!("step {index} ({name}) failed"));
            }
        }
    }

    Ok(SimulationReport {
        steps: reports,
        events: protocol.drain_events(),
        summary: protocol.summary()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sova_protocol::ProtocolConfig;

    fn deploy() -> Protocol {
        Protocol::from_config(&ProtocolConfig::default(), Timestamp::new(0)).unwrap()
    }

    const SCRIPT: &str = r#"[
        { "at": 10, "caller": "alice",
          "action": { "approve": { "asset": "wbtc", "spender": "vault", "amount": 100000000 } } },
        { "at": 10, "caller": "alice",
          "action": { "deposit": { "asset": "wbtc", "amount": 100000000 } } },
        { "at": 20, "caller": "alice", "action": "claim_rewards", "expect_error": true },
        { "at": 30, "caller": "alice",
          "action": { "request_queued_redemption": { "shares": 100000000 } } }
    ]"#;

    #[test]
    fn runs_a_scripted_flow() {
        let steps: Vec<Step> = serde_json::from_str(SCRIPT).unwrap();
        let mut protocol = deploy();
        let report = run(&mut protocol, steps).unwrap();
        assert_eq!(report.steps.len(), 4);
        assert_eq!(report.steps[1].outcome, Some(Outcome::Amount(100_000_000)));
        assert!(report.steps[2].error.is_some());
        assert!(matches!(report.steps[3].outcome, Some(Outcome::Request(_))));
        assert_eq!(report.summary.shares_in_custody, 100_000_000);
        assert!(!report.events.is_empty());
    }

    #[test]
    fn unexpected_failure_aborts() {
        let steps = vec![Step {
            at: 1,
            caller: Address::from_label("alice"),
            action: Action::ClaimRewards,
            expect_error: false,
        }];
        let err = run(&mut deploy(), steps).unwrap_err();
        assert!(err.to_string().contains("step 0 (claim_rewards) failed"));
    }

    #[test]
    fn unexpected_success_aborts() {
        let steps = vec![Step {
            at: 1,
            caller: Address::from_label("alice"),
            action: Action::Approve {
                asset: Address::from_label("wbtc"),
                spender: Address::from_label("vault"),
                amount: 1,
            },
            expect_error: true,
        }];
        assert!(run(&mut deploy(), steps).is_err());
    }

    #[test]
    fn time_cannot_go_backwards() {
        let step = |at| Step {
            at,
            caller: Address::from_label("alice"),
            action: Action::Approve {
                asset: Address::from_label("wbtc"),
                spender: Address::from_label("vault"),
                amount: 1,
            },
            expect_error: false,
        };
        assert!(run(&mut deploy(), vec![step(5), step(4)]).is_err());
    }

    #[test]
    fn loads_scripts_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        std::fs::write(&path, SCRIPT).unwrap();
        assert_eq!(load_script(&path).unwrap().len(), 4);
        assert!(load_script(&dir.path().join("missing.json")).is_err());
    }
}

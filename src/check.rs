//! Availability check orchestration
//!
//! Walks the probe chain in order and returns the first real answer.
//! When every admitted probe fails, the checker degrades to the
//! simulator so a pass always produces a result.

use std::sync::Arc;

use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::probe::{CheckResult, Probe};
use crate::simulator::{SimulationTrigger, Simulator};

pub struct Checker {
    probes: Vec<Arc<dyn Probe>>,
    simulator: Simulator,
}

impl Checker {
    pub fn new(probes: Vec<Arc<dyn Probe>>) -> Self {
        Self {
            probes,
            simulator: Simulator,
        }
    }

    /// One full availability check. `include_on_demand` admits probes
    /// that opted out of scheduled passes.
    pub async fn run_check(&self, config: &MonitorConfig, include_on_demand: bool) -> CheckResult {
        if let Err(failure) = config.validate() {
            tracing::warn!(
                "Rejected check: {} is too short ({} chars)",
                failure.field.wire_name(),
                failure.provided_length
            );
            return CheckResult::validation_failure(&failure);
        }

        let mut last_error: Option<MonitorError> = None;
        for probe in &self.probes {
            if probe.on_demand_only() && !include_on_demand {
                tracing::debug!("Skipping {} probe in scheduled pass", probe.name());
                continue;
            }
            match probe.check(config).await {
                Ok(result) => {
                    tracing::info!(
                        "{} probe answered: available={}",
                        probe.name(),
                        result.appointment_available
                    );
                    return result;
                }
                Err(e) => {
                    tracing::warn!("{} probe failed: {}", probe.name(), e);
                    last_error = Some(e);
                }
            }
        }

        let trigger = trigger_from(last_error);
        tracing::info!(
            "No probe produced an answer, falling back to simulation ({})",
            trigger.reason()
        );
        self.simulator.run(config, &trigger)
    }
}

fn trigger_from(last_error: Option<MonitorError>) -> SimulationTrigger {
    match last_error {
        Some(MonitorError::Blocked { url, status }) => {
            SimulationTrigger::BlockedEmpty { url, status }
        }
        Some(MonitorError::Http(_)) | None => SimulationTrigger::SiteUnreachable,
        Some(other) => SimulationTrigger::CriticalError {
            error: other.to_string(),
        },
    }
}

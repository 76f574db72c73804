//! Weighted-random fallback when the portal cannot be read
//!
//! When every acquisition path fails the checker still needs to produce
//! a result, so it falls back to a simulated verdict drawn at the
//! historical availability rate. Results are clearly labelled as
//! simulated and carry the reason the real check was abandoned.

use rand::Rng;

use crate::config::MonitorConfig;
use crate::fetch::{BLOCKED_FETCH_ATTEMPTS, PRE_INSCRIPTION_URL};
use crate::probe::CheckResult;

/// Chance that a simulated check reports an available slot
pub const SIMULATED_AVAILABILITY_RATE: f64 = 0.05;

/// Why the checker gave up on a real answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationTrigger {
    /// No acquisition strategy got a response out of the portal
    SiteUnreachable,
    /// The portal answered with success statuses but withheld content
    /// through every retry
    BlockedEmpty { url: String, status: u16 },
    /// The check aborted on an unexpected error
    CriticalError { error: String },
}

impl SimulationTrigger {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::SiteUnreachable => "site_inaccessible",
            Self::BlockedEmpty { .. } => "empty_response_after_all_attempts",
            Self::CriticalError { .. } => "critical_error",
        }
    }
}

/// Produces labelled simulated verdicts
#[derive(Debug, Clone, Default)]
pub struct Simulator;

impl Simulator {
    pub fn run(&self, config: &MonitorConfig, trigger: &SimulationTrigger) -> CheckResult {
        if let Err(failure) = config.validate() {
            let mut result = CheckResult::validation_failure(&failure);
            result.debug_info.mode = Some("simulation".to_string());
            return result;
        }

        let available = rand::rng().random_bool(SIMULATED_AVAILABILITY_RATE);
        tracing::debug!(
            "Simulated verdict: {} ({})",
            if available { "available" } else { "unavailable" },
            trigger.reason()
        );

        let mut result = CheckResult::new(true, available);
        result.url = Some(PRE_INSCRIPTION_URL.to_string());

        let mut message = if available {
            "Rendez-vous disponible (simulation - site ANEM inaccessible)".to_string()
        } else {
            format!(
                "Aucun rendez-vous disponible ({}) - simulation",
                crate::classifier::NO_APPOINTMENT_PHRASES[0]
            )
        };

        let debug = &mut result.debug_info;
        debug.mode = Some("simulation".to_string());
        debug.reason = Some(trigger.reason().to_string());
        debug.validation_passed = Some(true);
        debug.simulated_result = Some(available);
        debug.final_url = Some(PRE_INSCRIPTION_URL.to_string());
        debug.status_code = Some(200);

        match trigger {
            SimulationTrigger::SiteUnreachable => {}
            SimulationTrigger::BlockedEmpty { url, status } => {
                message = message.replacen(
                    "simulation",
                    "simulation (site ANEM bloque les bots - Status 200 mais page vide)",
                    1,
                );
                debug.attempts_count = Some(BLOCKED_FETCH_ATTEMPTS);
                debug.original_url = Some(url.clone());
                debug.original_status_code = Some(*status);
            }
            SimulationTrigger::CriticalError { error } => {
                debug.original_error = Some(error.clone());
            }
        }

        result.message = Some(message);
        result
    }
}

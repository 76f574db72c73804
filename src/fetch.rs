//! Ordered HTTP acquisition of ANEM portal pages
//!
//! The portal serves its booking page reluctantly to non-browser clients,
//! so acquisition walks a fixed list of strategies (different URL, header
//! profile and timeout each) and takes the first body that looks like a
//! real page. A success status with a near-empty body means the portal
//! accepted the request but withheld content; those responses go through
//! a retry ladder of progressively more browser-like header profiles
//! before the check is declared blocked.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::classifier::Classifier;
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::io::HttpClient;
use crate::probe::{CheckResult, Probe};

pub const PRE_INSCRIPTION_URL: &str = "https://minha.anem.dz/pre_inscription";
pub const PORTAL_HOME_URL: &str = "https://minha.anem.dz/";
pub const AGENCY_SITE_URL: &str = "https://www.anem.dz/";

/// Trimmed bodies shorter than this are treated as withheld content
pub const MIN_BODY_LENGTH: usize = 100;

/// Attempts counted toward a blocked verdict: the first acquisition plus
/// the two ladder retries
pub const BLOCKED_FETCH_ATTEMPTS: u32 = 3;

pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

struct Strategy {
    name: &'static str,
    url: &'static str,
    headers: &'static [(&'static str, &'static str)],
    timeout: Duration,
}

static STRATEGIES: [Strategy; 3] = [
    Strategy {
        name: "Standard",
        url: PRE_INSCRIPTION_URL,
        headers: &[
            ("User-Agent", DESKTOP_USER_AGENT),
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
            ),
            ("Accept-Language", "fr-FR,fr;q=0.9,en;q=0.8,ar;q=0.7"),
            ("DNT", "1"),
            ("Connection", "keep-alive"),
            ("Upgrade-Insecure-Requests", "1"),
            ("Sec-Fetch-Dest", "document"),
            ("Sec-Fetch-Mode", "navigate"),
            ("Sec-Fetch-Site", "none"),
            ("Sec-Fetch-User", "?1"),
            ("Cache-Control", "max-age=0"),
        ],
        timeout: Duration::from_secs(20),
    },
    Strategy {
        name: "Simple",
        url: PORTAL_HOME_URL,
        headers: &[
            ("User-Agent", "Mozilla/5.0 (compatible; ANEMBot/1.0)"),
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        ],
        timeout: Duration::from_secs(15),
    },
    Strategy {
        name: "Alternative",
        url: AGENCY_SITE_URL,
        headers: &[
            ("User-Agent", "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36"),
            ("Accept", "text/html"),
        ],
        timeout: Duration::from_secs(10),
    },
];

struct RetryProfile {
    name: &'static str,
    headers: &'static [(&'static str, &'static str)],
    timeout: Duration,
    delay: Duration,
}

static RETRY_PROFILES: [RetryProfile; 2] = [
    RetryProfile {
        name: "ultra-realistic headers",
        headers: &[
            ("User-Agent", DESKTOP_USER_AGENT),
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
            ),
            ("Accept-Language", "fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.7,ar;q=0.6"),
            ("DNT", "1"),
            ("Connection", "keep-alive"),
            ("Upgrade-Insecure-Requests", "1"),
            ("Sec-Fetch-Dest", "document"),
            ("Sec-Fetch-Mode", "navigate"),
            ("Sec-Fetch-Site", "none"),
            ("Sec-Fetch-User", "?1"),
            ("Cache-Control", "max-age=0"),
            (
                "sec-ch-ua",
                r#""Not_A Brand";v="8", "Chromium";v="120", "Google Chrome";v="120""#,
            ),
            ("sec-ch-ua-mobile", "?0"),
            ("sec-ch-ua-platform", r#""Windows""#),
        ],
        timeout: Duration::from_secs(15),
        delay: Duration::ZERO,
    },
    RetryProfile {
        name: "delay and Google referer",
        headers: &[
            ("User-Agent", DESKTOP_USER_AGENT),
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
            ("Accept-Language", "fr-FR,fr;q=0.9,ar;q=0.8"),
            ("Referer", "https://www.google.com/search?q=anem+algerie"),
            ("Cookie", "session_id=test123; lang=fr; visited=1"),
        ],
        timeout: Duration::from_secs(10),
        delay: Duration::from_secs(3),
    },
];

fn body_qualifies(body: &str) -> bool {
    body.trim().chars().count() >= MIN_BODY_LENGTH
}

/// HTTP acquisition probe: strategy walk, then the retry ladder
pub struct FetchProbe {
    http: Arc<dyn HttpClient>,
    classifier: Classifier,
}

impl FetchProbe {
    pub fn new(http: Arc<dyn HttpClient>, classifier: Classifier) -> Self {
        Self { http, classifier }
    }

    fn analyze(&self, strategy: &str, url: &str, status: u16, html: &str) -> CheckResult {
        let analysis = self.classifier.classify(html);
        let mut result = CheckResult::new(true, analysis.matched_phrase.is_none());
        result.url = Some(url.to_string());
        result.message = Some(match &analysis.matched_phrase {
            Some(phrase) => {
                format!("Aucun rendez-vous disponible ({phrase}) - analyse réelle")
            }
            None => "Aucun message 'pas de RDV' trouvé sur la page réelle - Rendez-vous possiblement disponible!".to_string(),
        });

        let debug = &mut result.debug_info;
        debug.method = Some("real_page_analysis".to_string());
        debug.strategy = Some(strategy.to_string());
        debug.final_url = Some(url.to_string());
        debug.status_code = Some(status);
        debug.response_length = Some(html.chars().count());
        debug.found_no_appointment_message = Some(analysis.matched_phrase.is_some());
        debug.has_token = Some(analysis.csrf_token.is_some());
        debug.has_form = Some(analysis.has_form);
        debug.has_submit_button = Some(analysis.has_submit_button);
        debug.has_input_fields = Some(analysis.has_input_fields);
        result
    }
}

#[async_trait]
impl Probe for FetchProbe {
    fn name(&self) -> &str {
        "fetch"
    }

    async fn check(&self, _config: &MonitorConfig) -> crate::Result<CheckResult> {
        let mut blocked: Option<(&'static Strategy, u16)> = None;

        for strategy in &STRATEGIES {
            tracing::debug!("Trying {} strategy: {}", strategy.name, strategy.url);
            let response = match self
                .http
                .get(strategy.url, strategy.headers, strategy.timeout)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!("{} strategy failed: {}", strategy.name, e);
                    continue;
                }
            };

            if !response.is_success() {
                tracing::debug!(
                    "{} strategy returned status {}",
                    strategy.name,
                    response.status
                );
                continue;
            }

            if body_qualifies(&response.body) {
                tracing::debug!(
                    "{} strategy succeeded ({} chars)",
                    strategy.name,
                    response.body.chars().count()
                );
                return Ok(self.analyze(
                    strategy.name,
                    strategy.url,
                    response.status,
                    &response.body,
                ));
            }

            tracing::debug!(
                "{} strategy returned status {} with a near-empty body",
                strategy.name,
                response.status
            );
            if blocked.is_none() {
                blocked = Some((strategy, response.status));
            }
        }

        let Some((strategy, status)) = blocked else {
            return Err(MonitorError::Http(
                "all acquisition strategies failed".to_string(),
            ));
        };

        // The portal answered but withheld the page. Retry the same URL
        // with progressively more browser-like profiles.
        for profile in &RETRY_PROFILES {
            if !profile.delay.is_zero() {
                tokio::time::sleep(profile.delay).await;
            }
            tracing::debug!("Retrying {} with {}", strategy.url, profile.name);
            match self
                .http
                .get(strategy.url, profile.headers, profile.timeout)
                .await
            {
                Ok(response) if body_qualifies(&response.body) => {
                    tracing::debug!(
                        "Retry with {} recovered the page ({} chars)",
                        profile.name,
                        response.body.chars().count()
                    );
                    return Ok(self.analyze(
                        strategy.name,
                        strategy.url,
                        response.status,
                        &response.body,
                    ));
                }
                Ok(_) => {
                    tracing::debug!("Retry with {} still near-empty", profile.name);
                }
                Err(e) => {
                    tracing::debug!("Retry with {} failed: {}", profile.name, e);
                }
            }
        }

        Err(MonitorError::Blocked {
            url: strategy.url.to_string(),
            status,
        })
    }
}

//! Headless-browser probe
//!
//! Escalation step for when plain HTTP acquisition is blocked: drive a
//! real Chrome through the portal's pre-inscription form and classify
//! what the browser actually rendered. Too heavy for the repeating
//! timer, so the probe is on-demand only.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};

use crate::classifier::Classifier;
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::fetch::{DESKTOP_USER_AGENT, PRE_INSCRIPTION_URL};
use crate::probe::{CheckResult, Probe};

const WORK_CARD_SELECTOR: &str =
    r#"input[name*="carte"], input[name*="work"], input[id*="carte"]"#;
const NATIONAL_ID_SELECTOR: &str =
    r#"input[name*="national"], input[name*="id"], input[id*="national"]"#;
const SUBMIT_SELECTOR: &str = r#"button[type="submit"], input[type="submit"]"#;

const ACCEPT_LANGUAGE: &str = "fr-FR,fr;q=0.9,ar;q=0.8,en;q=0.7";

const BROWSER_ARGS: [&str; 7] = [
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--no-first-run",
    "--no-zygote",
    "--single-process",
    "--disable-gpu",
];

/// One rendered page under the probe's control
#[cfg_attr(test, mockall::automock)]
pub trait BrowserPage: Send {
    fn navigate(&self, url: &str) -> crate::Result<()>;
    fn content(&self) -> crate::Result<String>;
    fn title(&self) -> crate::Result<String>;
    fn current_url(&self) -> String;
    fn has_element(&self, selector: &str) -> bool;
    fn type_into(&self, selector: &str, value: &str) -> crate::Result<()>;
    fn click(&self, selector: &str) -> crate::Result<()>;
}

/// Starts a browser and hands back a ready tab
#[cfg_attr(test, mockall::automock)]
pub trait BrowserLauncher: Send + Sync {
    fn launch(&self) -> crate::Result<Box<dyn BrowserPage>>;
}

/// Launches a local headless Chrome
#[derive(Debug, Default)]
pub struct HeadlessChromeLauncher;

impl BrowserLauncher for HeadlessChromeLauncher {
    fn launch(&self) -> crate::Result<Box<dyn BrowserPage>> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .args(BROWSER_ARGS.iter().map(|arg| OsStr::new(*arg)).collect())
            .build()
            .map_err(|e| {
                MonitorError::Browser(format!("Failed to build Chrome launch options: {e}"))
            })?;
        let browser = Browser::new(options)
            .map_err(|e| MonitorError::Browser(format!("Failed to launch headless Chrome: {e}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| MonitorError::Browser(format!("Failed to create tab: {e}")))?;
        tab.set_user_agent(DESKTOP_USER_AGENT, Some(ACCEPT_LANGUAGE), None)
            .map_err(|e| MonitorError::Browser(format!("Failed to set user agent: {e}")))?;
        tab.set_default_timeout(Duration::from_secs(30));

        Ok(Box::new(HeadlessChromePage {
            _browser: browser,
            tab,
        }))
    }
}

/// Keeps the Chrome process alive for as long as the tab is in use
struct HeadlessChromePage {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserPage for HeadlessChromePage {
    fn navigate(&self, url: &str) -> crate::Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| MonitorError::Browser(format!("Navigation failed: {e}")))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| MonitorError::Browser(format!("Page load failed: {e}")))?;
        Ok(())
    }

    fn content(&self) -> crate::Result<String> {
        self.tab
            .get_content()
            .map_err(|e| MonitorError::Browser(format!("Failed to read page content: {e}")))
    }

    fn title(&self) -> crate::Result<String> {
        self.tab
            .get_title()
            .map_err(|e| MonitorError::Browser(format!("Failed to read page title: {e}")))
    }

    fn current_url(&self) -> String {
        self.tab.get_url()
    }

    fn has_element(&self, selector: &str) -> bool {
        self.tab.find_element(selector).is_ok()
    }

    fn type_into(&self, selector: &str, value: &str) -> crate::Result<()> {
        self.tab
            .find_element(selector)
            .and_then(|element| element.type_into(value).map(|_| ()))
            .map_err(|e| MonitorError::Browser(format!("Failed to fill {selector}: {e}")))
    }

    fn click(&self, selector: &str) -> crate::Result<()> {
        self.tab
            .find_element(selector)
            .and_then(|element| element.click().map(|_| ()))
            .map_err(|e| MonitorError::Browser(format!("Failed to click {selector}: {e}")))
    }
}

/// Probe that checks availability through a real rendered page
pub struct BrowserProbe {
    launcher: Arc<dyn BrowserLauncher>,
    classifier: Classifier,
    settle_delay: Duration,
    post_submit_delay: Duration,
}

impl BrowserProbe {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, classifier: Classifier) -> Self {
        Self {
            launcher,
            classifier,
            settle_delay: Duration::from_secs(3),
            post_submit_delay: Duration::from_secs(5),
        }
    }
}

#[async_trait]
impl Probe for BrowserProbe {
    fn name(&self) -> &str {
        "headless_browser"
    }

    fn on_demand_only(&self) -> bool {
        true
    }

    async fn check(&self, config: &MonitorConfig) -> crate::Result<CheckResult> {
        let launcher = Arc::clone(&self.launcher);
        let classifier = self.classifier.clone();
        let config = config.clone();
        let settle_delay = self.settle_delay;
        let post_submit_delay = self.post_submit_delay;

        // headless_chrome is a blocking API
        tokio::task::spawn_blocking(move || {
            probe_once(
                launcher.as_ref(),
                &classifier,
                &config,
                settle_delay,
                post_submit_delay,
            )
        })
        .await
        .map_err(|_| MonitorError::Browser("browser task panicked".to_string()))?
    }
}

fn probe_once(
    launcher: &dyn BrowserLauncher,
    classifier: &Classifier,
    config: &MonitorConfig,
    settle_delay: Duration,
    post_submit_delay: Duration,
) -> crate::Result<CheckResult> {
    let page = launcher.launch()?;
    page.navigate(PRE_INSCRIPTION_URL)?;
    std::thread::sleep(settle_delay);

    let html = page.content()?;
    let title = page.title().unwrap_or_default();
    let analysis = classifier.classify(&html);
    let mut matched_phrase = analysis.matched_phrase.clone();

    // A form with no verdict on it yet: submit the identifiers and
    // re-classify whatever the portal answers
    if analysis.has_form && matched_phrase.is_none() {
        match submit_form(page.as_ref(), config, post_submit_delay) {
            Ok(Some(submitted_html)) => {
                if let Some(phrase) = classifier.classify(&submitted_html).matched_phrase {
                    matched_phrase = Some(phrase);
                }
            }
            Ok(None) => {
                tracing::debug!("Form fields not found, keeping landing page verdict");
            }
            Err(e) => {
                tracing::warn!("Form submission failed: {}", e);
            }
        }
    }

    let mut result = CheckResult::new(true, matched_phrase.is_none());
    result.url = Some(PRE_INSCRIPTION_URL.to_string());
    result.message = Some(match &matched_phrase {
        Some(phrase) => format!("Aucun rendez-vous disponible ({phrase}) - navigateur réel"),
        None => {
            "Aucun message 'pas de RDV' trouvé - Rendez-vous possiblement disponible! - navigateur réel"
                .to_string()
        }
    });

    let debug = &mut result.debug_info;
    debug.method = Some("headless_browser".to_string());
    debug.final_url = Some(page.current_url());
    debug.status_code = Some(200);
    debug.response_length = Some(html.chars().count());
    debug.title = Some(title);
    debug.found_no_appointment_message = Some(matched_phrase.is_some());
    debug.has_token = Some(analysis.csrf_token.is_some());
    debug.has_form = Some(analysis.has_form);
    debug.has_submit_button = Some(analysis.has_submit_button);
    debug.has_input_fields = Some(analysis.has_input_fields);
    Ok(result)
}

fn submit_form(
    page: &dyn BrowserPage,
    config: &MonitorConfig,
    post_submit_delay: Duration,
) -> crate::Result<Option<String>> {
    if !page.has_element(WORK_CARD_SELECTOR) || !page.has_element(NATIONAL_ID_SELECTOR) {
        return Ok(None);
    }

    page.type_into(WORK_CARD_SELECTOR, &config.work_card_number)?;
    page.type_into(NATIONAL_ID_SELECTOR, &config.national_id_number)?;

    if !page.has_element(SUBMIT_SELECTOR) {
        return Ok(None);
    }
    page.click(SUBMIT_SELECTOR)?;
    std::thread::sleep(post_submit_delay);

    Ok(Some(page.content()?))
}

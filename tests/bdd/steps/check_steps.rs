//! BDD step definitions for the availability check feature

use std::sync::Arc;

use cucumber::{given, then, when};

use crate::world::{
    no_appointment_page, open_form_page, FixedPageClient, MonitorWorld, UnreachableClient,
};

#[given("the portal responds with the no-appointment page")]
fn portal_no_appointment(world: &mut MonitorWorld) {
    world.portal = Some(Arc::new(FixedPageClient::new(no_appointment_page())));
}

#[given("the portal responds with an open appointment form")]
fn portal_open_form(world: &mut MonitorWorld) {
    world.portal = Some(Arc::new(FixedPageClient::new(open_form_page())));
}

#[given("the portal is unreachable")]
fn portal_unreachable(world: &mut MonitorWorld) {
    world.portal = Some(Arc::new(UnreachableClient));
}

#[given(expr = "the work card number is {string}")]
fn work_card_number(world: &mut MonitorWorld, value: String) {
    let mut config = world.monitor_config();
    config.work_card_number = value;
    world.config = Some(config);
}

#[when("a check runs")]
async fn a_check_runs(world: &mut MonitorWorld) {
    let engine = world.ensure_engine();
    let config = world.monitor_config();
    world.last_result = Some(engine.check_once(&config, false).await);
}

#[then("the check reports no appointment available")]
fn no_appointment_reported(world: &mut MonitorWorld) {
    let result = world.last_result.as_ref().expect("no check result");
    assert!(result.success);
    assert!(!result.appointment_available);
}

#[then("the check reports an appointment available")]
fn appointment_reported(world: &mut MonitorWorld) {
    let result = world.last_result.as_ref().expect("no check result");
    assert!(result.success);
    assert!(result.appointment_available);
}

#[then("the check uses real page analysis")]
fn real_page_analysis(world: &mut MonitorWorld) {
    let result = world.last_result.as_ref().expect("no check result");
    assert_eq!(
        result.debug_info.method.as_deref(),
        Some("real_page_analysis")
    );
}

#[then("the check falls back to simulation")]
fn falls_back_to_simulation(world: &mut MonitorWorld) {
    let result = world.last_result.as_ref().expect("no check result");
    assert!(result.success);
    assert_eq!(result.debug_info.mode.as_deref(), Some("simulation"));
    assert_eq!(
        result.debug_info.reason.as_deref(),
        Some("site_inaccessible")
    );
}

#[then("the check fails validation")]
fn fails_validation(world: &mut MonitorWorld) {
    let result = world.last_result.as_ref().expect("no check result");
    assert!(!result.success);
    assert_eq!(
        result.debug_info.validation_error.as_deref(),
        Some("workCardNumber")
    );
}

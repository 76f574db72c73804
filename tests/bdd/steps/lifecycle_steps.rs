//! BDD step definitions for the monitoring lifecycle feature

use cucumber::{then, when};

use crate::world::MonitorWorld;

#[when("monitoring starts")]
async fn monitoring_starts(world: &mut MonitorWorld) {
    let engine = world.ensure_engine();
    let config = world.monitor_config();
    engine.start(config).await;
}

#[when("monitoring stops")]
async fn monitoring_stops(world: &mut MonitorWorld) {
    let engine = world.ensure_engine();
    engine.stop().await;
}

#[when(expr = "a test email is sent to {string}")]
async fn test_email_sent(world: &mut MonitorWorld, to: String) {
    let engine = world.ensure_engine();
    world.last_outcome = Some(engine.test_notification(&to).await);
}

#[then("the session is running")]
async fn session_running(world: &mut MonitorWorld) {
    let engine = world.ensure_engine();
    assert!(engine.session().read().await.is_running());
}

#[then("the session is not running")]
async fn session_not_running(world: &mut MonitorWorld) {
    let engine = world.ensure_engine();
    assert!(!engine.session().read().await.is_running());
}

#[then("the email outcome reports success")]
fn outcome_success(world: &mut MonitorWorld) {
    let outcome = world.last_outcome.as_ref().expect("no email outcome");
    assert!(outcome.success);
    assert_eq!(outcome.service.as_deref(), Some("recording"));
}

//! BDD step definitions for the email notification feature

use std::sync::Arc;

use cucumber::{given, then};

use crate::world::{FailingNotifier, MonitorWorld, RecordingNotifier};

#[given("a recording email notifier")]
fn recording_notifier(world: &mut MonitorWorld) {
    let recording = Arc::new(RecordingNotifier::new());
    world.recording = Some(Arc::clone(&recording));
    world.notifier = Some(recording);
}

#[given("an email notifier that always fails")]
fn failing_notifier(world: &mut MonitorWorld) {
    world.notifier = Some(Arc::new(FailingNotifier));
}

#[then("one email is recorded")]
async fn one_email_recorded(world: &mut MonitorWorld) {
    let recording = world
        .recording
        .as_ref()
        .expect("recording notifier not set");
    assert_eq!(recording.count().await, 1);
}

#[then("the check result records an email error")]
fn email_error_recorded(world: &mut MonitorWorld) {
    let result = world.last_result.as_ref().expect("no check result");
    assert_eq!(result.email_sent, Some(false));
    assert!(result.email_error.is_some());
}

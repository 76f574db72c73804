//! BDD test entry point for the rdvmonitor service

#[path = "bdd/world.rs"]
mod world;

#[path = "bdd/steps/mod.rs"]
mod steps;

use cucumber::World as _;
use world::MonitorWorld;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    MonitorWorld::run("tests/features").await;
}

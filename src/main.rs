use std::sync::Arc;
use std::time::Duration;

use colored::*;
use futures::future::join_all;

use permission_broker::core::{permission_set, CoordinatorEvent, RequestState};
use permission_broker::host::simulated::{deny_only, grant_all};
use permission_broker::host::{HostRegistry, SimulatedHost};
use permission_broker::location::{
    FixedLocationSource, LocationRepository, LocationState, ACCESS_COARSE_LOCATION,
};
use permission_broker::logging;
use permission_broker::permissions::{GrantLedger, PermissionCoordinator};
use permission_broker::CoordinatorConfig;

const CAMERA: &str = "android.permission.CAMERA";
const RECORD_AUDIO: &str = "android.permission.RECORD_AUDIO";

fn print_outcome(label: &str, outcome: &Result<impl std::fmt::Display, impl std::fmt::Display>) {
    match outcome {
        Ok(value) => println!("{} {}", format!("{}:", label).green().bold(), value),
        Err(e) => println!("{} {}", format!("{}:", label).red().bold(), e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging()?;

    tracing::info!("=== Permission Broker Demo ===");

    let config = CoordinatorConfig::from_env()?;
    let ledger = Arc::new(GrantLedger::new());
    let registry = Arc::new(HostRegistry::new());
    let coordinator = Arc::new(
        PermissionCoordinator::new(registry.clone(), config)?.with_grant_status(ledger.clone()),
    );

    // Print every state change as the coordinator moves through a request
    let mut events = coordinator.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                CoordinatorEvent::StateChange(RequestState::Idle) => {}
                CoordinatorEvent::StateChange(state) => {
                    println!("  {} {}", "state".dimmed(), state.to_string().cyan());
                }
                CoordinatorEvent::PromptPresented { permissions, .. } => {
                    println!("  {} {:?}", "prompt".dimmed(), permissions);
                }
                CoordinatorEvent::ResultDropped { request_id, .. } => {
                    println!("  {} {}", "dropped".dimmed(), request_id);
                }
            }
        }
    });

    // --- 1. Location requested before any screen exists ---
    println!("{}", "1. Location fetch, screen appears 300ms later".bold());
    let repository = LocationRepository::new(
        coordinator.clone(),
        Arc::new(FixedLocationSource::new(52.520008, 13.404954)),
    );
    let screen = Arc::new(
        SimulatedHost::new(
            "main-screen",
            coordinator.clone(),
            deny_only(permission_set([ACCESS_COARSE_LOCATION])),
        )
        .with_ledger(ledger.clone()),
    );
    let late_registration = {
        let registry = registry.clone();
        let screen = screen.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            registry.register(&screen);
        })
    };
    let outcome = repository.get_location().await;
    late_registration.await?;
    let state = match &outcome {
        Ok(location) => LocationState::Loaded(location.clone()),
        Err(_) => LocationState::Empty,
    };
    print_outcome("location", &outcome);
    tracing::info!("Location state: {:?}", state);

    // --- 2. Concurrent callers are served one prompt at a time ---
    println!("{}", "2. Two concurrent requests".bold());
    let rotated = Arc::new(
        SimulatedHost::new("main-screen", coordinator.clone(), grant_all())
            .with_ledger(ledger.clone()),
    );
    screen.destroy();
    registry.register(&rotated);
    let outcomes = join_all([CAMERA, RECORD_AUDIO].into_iter().map(|permission| {
        let coordinator = coordinator.clone();
        async move {
            coordinator
                .check_permissions(permission_set([permission]))
                .await
                .map(|()| permission)
        }
    }))
    .await;
    for outcome in &outcomes {
        print_outcome("request", outcome);
    }

    // --- 3. Already granted: no prompt ---
    println!("{}", "3. Camera again".bold());
    let presented_before = rotated.presented_count();
    let outcome = coordinator
        .check_permissions(permission_set([CAMERA]))
        .await
        .map(|()| format!("granted without prompt: {}", rotated.presented_count() == presented_before));
    print_outcome("camera", &outcome);

    // --- 4. No usable screen at all ---
    println!("{}", "4. Screen torn down".bold());
    rotated.destroy();
    let outcome = coordinator
        .check_permissions(permission_set(["android.permission.READ_CONTACTS"]))
        .await
        .map(|()| "granted");
    print_outcome("contacts", &outcome);

    println!("{} {:?}", "granted:".bold(), ledger.granted());
    tracing::info!("=== Permission Broker Demo Finished ===");

    Ok(())
}

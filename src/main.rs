use confab::application::CallService;
use confab::config::Config;
use confab::domain::provider::{JoinOptions, ProviderRegistry};
use confab::domain::room::{Room, StandardCallTypeClassifier};
use confab::domain::shared::value_objects::{RoomId, UserId};
use confab::domain::user::User;
use confab::infrastructure::persistence::{
    InMemoryCallRepository, InMemoryMessageRepository, InMemoryRoomRepository,
    InMemoryUserRepository,
};
use confab::infrastructure::provider::StaticProviderRegistry;
use confab::interface::api::{build_router, init_metrics, AppState};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Starting Confab call server");

    // Load configuration
    let config = Config::load()?;
    info!("Configuration loaded: {:?}", config);

    // In-memory stores
    let calls = Arc::new(InMemoryCallRepository::new());
    let rooms = Arc::new(InMemoryRoomRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let messages = Arc::new(InMemoryMessageRepository::new());

    // Seed test users and rooms (in-memory)
    let alice = User::new("alice".to_string(), Some("Alice".to_string()));
    let bob = User::new("bob".to_string(), Some("Bob".to_string()));
    let direct = Room::direct(vec![alice.id, bob.id]);
    let general = Room::channel("general".to_string());

    let alice_id = alice.id;
    let general_id = general.id;
    info!("Added test users: alice, bob (in-memory)");
    info!("Added test rooms: direct {} / channel {}", direct.id, general.id);

    users.insert(alice);
    users.insert(bob);
    rooms.insert(direct);
    rooms.insert(general);

    // Provider registry from configuration
    let registry = Arc::new(StaticProviderRegistry::from_config(&config.provider));
    let active_provider = registry.active_provider();
    match active_provider.as_deref() {
        Some(active) => info!("Active call provider: {}", active),
        None => info!("No active call provider configured"),
    }

    let call_service = Arc::new(CallService::new(
        calls,
        rooms,
        users,
        messages,
        registry,
        Arc::new(StandardCallTypeClassifier),
        config.server.base_url.clone(),
    ));

    // Demo: run one call through its lifecycle to verify the wiring
    if active_provider.is_some() {
        demo_call_flow(&call_service, alice_id, general_id).await?;
    }

    // Initialize metrics exporter
    info!("Initializing Prometheus metrics exporter");
    let prometheus_handle = init_metrics();

    let state = AppState {
        call_service: call_service.clone(),
    };
    let app = build_router(state, prometheus_handle);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))
            .await?;
    info!(
        "REST API server started on {}:{}",
        config.server.host, config.server.port
    );

    let api_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("API server failed");
    });

    // Keep the server running
    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    api_handle.abort();
    info!("API server stopped");

    Ok(())
}

/// Demonstrate the call lifecycle
async fn demo_call_flow(
    service: &CallService,
    caller: UserId,
    room_id: RoomId,
) -> anyhow::Result<()> {
    info!("=== Call Flow Demo ===");

    let instructions = service
        .start(&caller, &room_id, Some("Kickoff".to_string()))
        .await?;
    let call_id = instructions.call_id();
    info!("Call created: {:?}", instructions);

    let url = service
        .join(&caller, &call_id, JoinOptions::default())
        .await?;
    info!("Join URL for caller: {}", url);

    if let Some(call) = service.get(&call_id).await? {
        info!(
            "Call status: {}, participants: {}",
            call.status.as_str(),
            call.participants.len()
        );
    }

    info!("=== Call Flow Demo Complete ===");

    Ok(())
}

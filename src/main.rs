use axum::{
    extract::Extension,
    routing::get,
    Router,
};
use catalog_federation::aggregation::engine::AggregationEngine;
use catalog_federation::aggregation::handlers::handle_federated_publications;
use catalog_federation::broadcast::engine::BroadcastEngine;
use catalog_federation::config;
use catalog_federation::directory::handlers::{handle_get_directory, handle_register};
use catalog_federation::directory::protocol::{
    PeerAnnouncement, ENDPOINT_DIRECTORY, ENDPOINT_FEDERATION_PUBLICATIONS,
};
use catalog_federation::directory::store::{InMemoryPeerStore, PeerStore};
use catalog_federation::directory::types::PeerRecord;
use catalog_federation::fetch::client::FetchClient;
use catalog_federation::sync::engine::SyncEngine;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 5 {
        eprintln!(
            "Usage: {} --bind <addr:port> --config <file.json> [--seed <directory-url>]",
            args[0]
        );
        eprintln!("Example: {} --bind 127.0.0.1:8080 --config instance.json", args[0]);
        eprintln!(
            "Example: {} --bind 127.0.0.1:8081 --config instance.json --seed http://127.0.0.1:8080/directory",
            args[0]
        );
        std::process::exit(1);
    }

    let mut bind_addr: Option<SocketAddr> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut seeds: Vec<String> = vec![];

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                bind_addr = Some(args[i + 1].parse()?);
                i += 2;
            }
            "--config" => {
                config_path = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--seed" => {
                seeds.push(args[i + 1].clone());
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let bind_addr = bind_addr.expect("--bind is required");
    let config_path = config_path.expect("--config is required");

    let app_config = config::load(&config_path)?;
    seeds.extend(app_config.seeds.iter().cloned());

    tracing::info!("Starting instance {}", app_config.instance.directory_url);
    if seeds.is_empty() {
        tracing::info!("No seed peers configured, waiting for incoming registrations");
    } else {
        tracing::info!("Seed peers: {:?}", seeds);
    }

    // 1. Peer store and outbound client:
    let store: Arc<dyn PeerStore> = Arc::new(InMemoryPeerStore::new());
    let client = Arc::new(FetchClient::new(&app_config.http)?);
    let identity = Arc::new(app_config.instance.clone());

    // Seed peers are operator-curated, so they join federated aggregation.
    for seed in &seeds {
        let mut record = PeerRecord::from_announcement(&PeerAnnouncement {
            directory_url: seed.clone(),
            title: String::new(),
            summary: String::new(),
            description: String::new(),
            catalog_ids: vec![],
            publications_endpoint: None,
        });
        record.is_default = true;
        store.upsert(record)?;
    }

    // 2. Engines:
    let sync_engine = Arc::new(SyncEngine::new(
        store.clone(),
        client.clone(),
        identity.clone(),
    ));
    let broadcast_engine = Arc::new(BroadcastEngine::new(
        store.clone(),
        client.clone(),
        identity.clone(),
    ));
    let aggregation_engine = Arc::new(AggregationEngine::new(store.clone(), client.clone()));

    // 3. Background schedulers. One task per engine, so at most one cycle of
    // each is ever in flight; the first tick fires immediately, which covers
    // the initial sync/announcement against the seeds.
    let sync_interval = Duration::from_secs(app_config.sync_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sync_interval);
        loop {
            interval.tick().await;
            match sync_engine.run().await {
                Ok(report) => tracing::info!(
                    "Sync cycle: {}/{} peers reachable, {} discovered, {} registrations sent",
                    report.reachable,
                    report.contacted,
                    report.discovered,
                    report.registrations_sent
                ),
                Err(e) => tracing::error!("Sync cycle failed: {}", e),
            }
        }
    });

    let broadcast_interval = Duration::from_secs(app_config.broadcast_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(broadcast_interval);
        loop {
            interval.tick().await;
            match broadcast_engine.run(None).await {
                Ok(report) => tracing::info!(
                    "Broadcast cycle: {}/{} peers reached",
                    report.succeeded,
                    report.attempted
                ),
                Err(e) => tracing::error!("Broadcast cycle failed: {}", e),
            }
        }
    });

    // 4. HTTP router (this instance's side of the wire protocol):
    let app = Router::new()
        .route(
            ENDPOINT_DIRECTORY,
            get(handle_get_directory).post(handle_register),
        )
        .route(
            ENDPOINT_FEDERATION_PUBLICATIONS,
            get(handle_federated_publications),
        )
        .layer(Extension(store))
        .layer(Extension(identity))
        .layer(Extension(aggregation_engine));

    tracing::info!("HTTP server listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

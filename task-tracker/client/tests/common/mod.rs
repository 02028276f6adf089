#![allow(dead_code)]

use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database};
use task_tracker_server::web::create_app;

/// Starts the tracker on an ephemeral port backed by an in-memory database.
/// Returns the base URL of the running server.
pub async fn spawn_server() -> String {
    let _ = tracing_subscriber::fmt().try_init();

    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to database");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to apply migrations");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let address = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, create_app(db))
            .await
            .expect("Server stopped unexpectedly");
    });

    format!("http://{}", address)
}

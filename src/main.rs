// Golazo three-way sports book - main entry point

use std::net::SocketAddr;
use std::sync::Arc;

use golazo_book::app_state::{AppState, SharedState};
use golazo_book::handlers::app;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    println!("\n═══════════════════════════════════════════════");
    println!("     ⚽ Golazo Three-Way Sports Book");
    println!("═══════════════════════════════════════════════\n");

    // Initialize application state (restores persisted book if present)
    let state: SharedState = Arc::new(AppState::new());

    // Clone state for shutdown handler before moving into router
    let shutdown_state = state.clone();

    let router = app(state);

    let port: u16 = std::env::var("BOOK_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("📋 Available Endpoints:");
    println!("   GET  /events               - Daily slate (seeds on first call)");
    println!("   GET  /events/:id           - Event details");
    println!("   POST /bets                 - Place a wager");
    println!("   GET  /bets/:id             - Wager details");
    println!("   POST /bets/:id/status      - Settle a wager (WON/LOST)");
    println!("   POST /users                - Register an account");
    println!("   GET  /users/:email/bets    - Wager history");
    println!("   GET  /users/:email/balance - Account balance");
    println!("   POST /users/:email/resolve - Settle pending wagers");
    println!();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listener");
    tracing::info!(%addr, "server running");

    // Save state before exit
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");

        tracing::info!("shutdown signal received, saving state");
        if let Err(e) = shutdown_state.save_to_disk() {
            tracing::error!(error = %e, "failed to save state");
        }
        std::process::exit(0);
    });

    axum::serve(listener, router).await.expect("server error");
}

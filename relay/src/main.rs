mod routes;
mod services;
mod state;

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_tests;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let state = state::AppState::new();

    // Spawn the idle session sweeper.
    let _sweeper = services::sweep::spawn_sweep_task(state.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "decopad relay listening");
    axum::serve(listener, app).await.expect("server failed");
}

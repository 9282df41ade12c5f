mod auth;
mod cart;
mod category;
mod checkout;
mod config;
mod contact;
mod content;
mod delivery;
mod newsletter;
mod notification;
mod order;
mod payments;
mod pool;
mod product;
mod review;
mod rmq;
mod state;
mod utils;
mod webhook;

use std::sync::Arc;

use axum::Router;
use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use listenfd::ListenFd;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::payments::PaymentClient;
use crate::state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/");

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(Config::load());

    run_migrations(config.database_url.clone()).await;

    let pool = pool::get_pool(&config.database_url)
        .await
        .expect("failed to create db pool");
    let payments = PaymentClient::new(&config);
    let state = AppState {
        pool,
        config: config.clone(),
        payments,
    };

    rmq::spawn_consumer(config.clone());

    let routes = Router::new()
        .merge(auth::routes::get_routes())
        .merge(product::routes::get_routes())
        .merge(category::routes::get_routes())
        .merge(cart::routes::get_routes())
        .merge(delivery::routes::get_routes())
        .merge(checkout::routes::get_routes())
        .merge(order::routes::get_routes())
        .merge(webhook::routes::get_routes())
        .merge(notification::routes::get_routes())
        .merge(review::routes::get_routes())
        .merge(newsletter::routes::get_routes())
        .merge(contact::routes::get_routes())
        .merge(content::routes::get_routes());

    let app = Router::new()
        .nest("/api", routes)
        .fallback(utils::handler_404)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // systemfd-provided socket during development, plain bind otherwise
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0).unwrap() {
        Some(listener) => {
            listener.set_nonblocking(true).unwrap();
            TcpListener::from_std(listener).unwrap()
        }
        None => TcpListener::bind(("0.0.0.0", config.port)).await.unwrap(),
    };

    info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn run_migrations(database_url: String) {
    tokio::task::spawn_blocking(move || {
        let mut conn =
            PgConnection::establish(&database_url).expect("failed to connect for migrations");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("failed to run migrations");
    })
    .await
    .expect("migration task panicked");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutting down");
}

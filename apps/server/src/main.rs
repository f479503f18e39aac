#![deny(warnings)]

//! HTTP facade for Lemonade Tycoon.
//!
//! A thin Axum layer mapping REST routes onto the simulation engine.
//! All game state lives in memory behind a single mutex; restarting the
//! process starts a fresh game.

mod routes;
mod state;

use anyhow::Result;
use rand::Rng;
use sim_core::GameConfig;
use sim_engine::Game;
use state::AppState;
use std::net::SocketAddr;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

fn bind_addr() -> SocketAddr {
    std::env::var("LEMONADE_ADDR")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 5000)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let config = GameConfig {
        rng_seed: rand::thread_rng().gen(),
        ..GameConfig::default()
    };
    let state = AppState::new(Game::new(config));

    let addr = bind_addr();
    info!(%addr, "lemonade stand open");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, routes::build_router(state)).await?;
    Ok(())
}

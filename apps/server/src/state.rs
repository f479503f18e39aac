//! Shared state handed to every handler.

use sim_engine::Game;
use std::sync::{Arc, Mutex, MutexGuard};

/// The one game instance, serialized behind a process-wide mutex.
/// Handlers do all their work synchronously while holding the guard and
/// never carry it across an await point.
#[derive(Clone)]
pub struct AppState {
    game: Arc<Mutex<Game>>,
}

impl AppState {
    pub fn new(game: Game) -> Self {
        Self {
            game: Arc::new(Mutex::new(game)),
        }
    }

    /// Lock the game. A poisoned lock is recovered: actions validate
    /// before they mutate, so the state a panicking thread left behind
    /// is still consistent.
    pub fn game(&self) -> MutexGuard<'_, Game> {
        self.game
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

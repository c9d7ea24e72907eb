//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::session::SessionKeys;
use medsum_core::ports::{DatabaseService, StorageService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
/// Nothing in it is mutated after construction.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub storage: Arc<dyn StorageService>,
    pub sessions: SessionKeys,
    pub config: Arc<Config>,
}

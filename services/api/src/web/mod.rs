pub mod auth;
pub mod documents;
pub mod health;
pub mod insights;
pub mod middleware;
pub mod rest;
pub mod router;
pub mod session;
pub mod state;

// Re-export the router builder so the binary and the tests share one table.
pub use router::build_router;

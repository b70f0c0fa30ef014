//! API layer - HTTP command surface, probes and middleware

pub mod commands;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;

pub use router::create_router;
pub use state::AppState;

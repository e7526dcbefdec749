//! HTTP layer for the departure gateway.
//!
//! Provides the stop search and departure board endpoints as JSON.

mod dto;
mod routes;
mod state;


pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;

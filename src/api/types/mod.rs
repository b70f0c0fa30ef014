//! Request and response types of the command API

pub mod command;
pub mod error;
pub mod json;

pub use command::AskRequest;
pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;

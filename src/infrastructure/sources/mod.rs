//! Document source implementations

mod static_texts;
mod web;

pub use static_texts::{DEFAULT_TEXTS, StaticSource};
pub use web::WebSource;

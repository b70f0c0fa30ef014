//! Document ingestion infrastructure: HTML extraction and text splitting

mod html;
mod splitter;

pub use html::{HtmlPage, extract_page};
pub use splitter::RecursiveTextSplitter;

//! Vector index backends

mod in_memory;
mod pgvector;
mod supabase;

pub use in_memory::InMemoryVectorIndex;
pub use pgvector::PgvectorIndex;
pub use supabase::{SupabaseConfig, SupabaseVectorIndex};

//! Retrieval-augmented answering: embed, retrieve, prompt, generate

mod answer;
mod factory;
mod pipeline;
mod prompt;

pub use answer::Answer;
pub use factory::PipelineFactory;
pub use pipeline::{GenerationSettings, RagPipeline};
pub use prompt::{QA_SYSTEM_TEMPLATE, build_qa_request, format_context};

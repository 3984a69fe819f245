pub mod builtins;
mod executor;
mod pipeline;

pub use builtins::Builtin;
pub use executor::Executor;
pub use pipeline::PipelineBuilder;

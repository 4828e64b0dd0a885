//! Tower middleware layers for the dispatch pipeline.
//!
//! - [`timeout`]: Per-invocation timeout with cooperative cancellation
//! - [`trace`]: Operation timing and status via `tracing` spans
//! - [`pipeline`]: Composes all layers around an `OperationService`

pub mod pipeline;
pub mod timeout;
pub mod trace;

pub use pipeline::build_dispatch_pipeline;
pub use timeout::TimeoutLayer;
pub use trace::TraceLayer;

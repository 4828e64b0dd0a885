//! Outcome service: binds concrete operations to their contracts and runs them.
//!
//! 1. **Contract** (`operation`): `Operation<C, R>` turns a command into an `Outcome<R>`
//! 2. **Registry** (`registry`): explicit, startup-time binding of implementations
//! 3. **Dispatch** (`dispatch`): resolves a fresh operation per call as a `tower::Service`
//! 4. **Middleware** (`middleware`): timeout and tracing layers around dispatch

pub mod config;
pub mod dispatch;
pub mod middleware;
pub mod operation;
pub mod registry;
pub mod telemetry;

pub use config::{DispatchConfig, LogConfig};
pub use dispatch::{OperationDispatcher, OperationService, OutcomeFuture};
pub use middleware::build_dispatch_pipeline;
pub use operation::{Invocation, Operation};
pub use registry::{
    Dependencies, OperationModule, OperationRegistry, OperationRegistryBuilder, RegistryEntry,
    RegistryError,
};
pub use telemetry::init_tracing;

//! Marker for values accepted as operation input.

/// Tags a type as a command an operation can execute.
///
/// Carries no behaviour. Implement it on plain request structs:
///
/// ```
/// use outcome_core::Command;
///
/// struct RenameProject {
///     id: u64,
///     name: String,
/// }
///
/// impl Command for RenameProject {}
/// ```
pub trait Command: Send + 'static {}

impl Command for () {}

//! Built-in tool catalog, guardrailed dispatch, and result normalization.
//!
//! [`BuiltinTools`] implements `corridor_core::ToolExecutor`: it validates
//! arguments against each tool's declared schema, runs the handler under
//! the configured guardrails, and normalizes the raw result into the
//! stable per-kind shape the structured-output retry loop expects.

pub mod dispatch;
pub mod handlers;
pub mod normalize;
pub mod registry;

pub use dispatch::BuiltinTools;
pub use normalize::normalize_tool_result;
pub use registry::{builtin_schemas, ToolRegistry};

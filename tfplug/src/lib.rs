//! tfplug - Terraform Plugin Framework for Rust
//!
//! The provider-facing half of a Terraform plugin: dynamic values, schemas,
//! planning helpers and the resource/provider traits.

// Core modules
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod provider;
pub mod resource;

// Helper modules
pub mod plan_modifier;
pub mod state;

// Re-exports for convenience
pub use error::{Result, TfplugError};
pub use plan_modifier::{plan_resource_change, RequiresReplaceIfChanged, UseStateForUnknown};
pub use provider::{Provider, ResourceFactory};
pub use resource::{Resource, ResourceWithConfigure, ResourceWithModifyPlan};
pub use schema::{AttributeBuilder, AttributeType, NestedBlockBuilder, Schema, SchemaBuilder};
pub use types::{AttributePath, Config, Diagnostic, Dynamic, DynamicValue, State};

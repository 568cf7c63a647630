//! The `aws_network_interface` resource
//!
//! [`NetworkInterfaceResource`] adapts the typed [`lifecycle`] to the plugin
//! framework; [`model`] and [`convert`] hold the pure translation between the
//! configuration, the API structures and persisted state.

pub mod convert;
pub mod error;
pub mod lifecycle;
pub mod model;
mod resource;

pub use error::NetworkInterfaceError;
pub use lifecycle::{CommittedAttribute, CreateOutcome, NetworkInterfaceLifecycle, UpdateOutcome};
pub use model::{AttachmentSpec, NetworkInterfaceConfig, NetworkInterfaceState, ObservedAttachment};
pub use resource::{NetworkInterfaceResource, TYPE_NAME};

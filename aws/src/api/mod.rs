//! EC2 API client
//!
//! [`Ec2Api`] is the seam resources depend on. [`Client`] implements it over
//! the EC2 query protocol; tests substitute in-memory fakes.

pub mod client;
pub mod common;
pub mod error;
pub mod network_interfaces;
pub mod pool;
pub mod tags;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
mod test_helpers;

pub use client::Client;
pub use error::ApiError;
pub use network_interfaces::{
    AttachNetworkInterfaceInput, CreateNetworkInterfaceInput, DetachNetworkInterfaceInput,
    GroupIdentifier, ModifyNetworkInterfaceAttributeInput, NetworkInterface,
    NetworkInterfaceAttachment, NetworkInterfacePrivateIpAddress, PrivateIpAddressSpecification,
};
pub use pool::ClientConfig;
pub use tags::Tag;

use async_trait::async_trait;

/// The EC2 operations the network interface resource needs
#[async_trait]
pub trait Ec2Api: Send + Sync {
    async fn create_network_interface(
        &self,
        input: &CreateNetworkInterfaceInput,
    ) -> Result<NetworkInterface, ApiError>;

    async fn describe_network_interfaces(
        &self,
        ids: &[String],
    ) -> Result<Vec<NetworkInterface>, ApiError>;

    async fn modify_network_interface_attribute(
        &self,
        input: &ModifyNetworkInterfaceAttributeInput,
    ) -> Result<(), ApiError>;

    async fn delete_network_interface(&self, id: &str) -> Result<(), ApiError>;

    /// Returns the attachment id
    async fn attach_network_interface(
        &self,
        input: &AttachNetworkInterfaceInput,
    ) -> Result<String, ApiError>;

    async fn detach_network_interface(
        &self,
        input: &DetachNetworkInterfaceInput,
    ) -> Result<(), ApiError>;

    async fn create_tags(&self, resource_ids: &[String], tags: &[Tag]) -> Result<(), ApiError>;

    async fn delete_tags(&self, resource_ids: &[String], tags: &[Tag]) -> Result<(), ApiError>;
}

#[async_trait]
impl Ec2Api for Client {
    async fn create_network_interface(
        &self,
        input: &CreateNetworkInterfaceInput,
    ) -> Result<NetworkInterface, ApiError> {
        self.network_interfaces().create(input).await
    }

    async fn describe_network_interfaces(
        &self,
        ids: &[String],
    ) -> Result<Vec<NetworkInterface>, ApiError> {
        self.network_interfaces().describe(ids).await
    }

    async fn modify_network_interface_attribute(
        &self,
        input: &ModifyNetworkInterfaceAttributeInput,
    ) -> Result<(), ApiError> {
        self.network_interfaces().modify_attribute(input).await
    }

    async fn delete_network_interface(&self, id: &str) -> Result<(), ApiError> {
        self.network_interfaces().delete(id).await
    }

    async fn attach_network_interface(
        &self,
        input: &AttachNetworkInterfaceInput,
    ) -> Result<String, ApiError> {
        self.network_interfaces().attach(input).await
    }

    async fn detach_network_interface(
        &self,
        input: &DetachNetworkInterfaceInput,
    ) -> Result<(), ApiError> {
        self.network_interfaces().detach(input).await
    }

    async fn create_tags(&self, resource_ids: &[String], tags: &[Tag]) -> Result<(), ApiError> {
        self.tags().create(resource_ids, tags).await
    }

    async fn delete_tags(&self, resource_ids: &[String], tags: &[Tag]) -> Result<(), ApiError> {
        self.tags().delete(resource_ids, tags).await
    }
}

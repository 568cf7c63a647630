//! Elastic network interface actions

use super::client::Client;
use super::common::QueryParams;
use super::error::ApiError;
use super::tags::Tag;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInterface {
    pub network_interface_id: String,
    #[serde(default)]
    pub subnet_id: Option<String>,
    #[serde(default)]
    pub vpc_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub private_ip_address: Option<String>,
    #[serde(default)]
    pub private_ip_addresses: Vec<NetworkInterfacePrivateIpAddress>,
    #[serde(default)]
    pub groups: Vec<GroupIdentifier>,
    #[serde(default)]
    pub attachment: Option<NetworkInterfaceAttachment>,
    #[serde(default)]
    pub tag_set: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInterfacePrivateIpAddress {
    #[serde(default)]
    pub private_ip_address: Option<String>,
    #[serde(default)]
    pub primary: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupIdentifier {
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInterfaceAttachment {
    #[serde(default)]
    pub attachment_id: Option<String>,
    #[serde(default)]
    pub instance_id: Option<String>,
    #[serde(default)]
    pub device_index: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateIpAddressSpecification {
    pub private_ip_address: String,
    pub primary: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateNetworkInterfaceInput {
    pub subnet_id: String,
    pub groups: Vec<String>,
    pub private_ip_addresses: Vec<PrivateIpAddressSpecification>,
    pub description: Option<String>,
}

impl CreateNetworkInterfaceInput {
    fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new()
            .add("SubnetId", &self.subnet_id)
            .add_list("SecurityGroupId", &self.groups)
            .add_optional("Description", self.description.as_ref());
        for (idx, spec) in self.private_ip_addresses.iter().enumerate() {
            params = params
                .add_member("PrivateIpAddresses", idx, "PrivateIpAddress", &spec.private_ip_address)
                .add_member("PrivateIpAddresses", idx, "Primary", spec.primary);
        }
        params
    }
}

/// Replaces the full security group set of an interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyNetworkInterfaceAttributeInput {
    pub network_interface_id: String,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachNetworkInterfaceInput {
    pub network_interface_id: String,
    pub instance_id: String,
    pub device_index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachNetworkInterfaceInput {
    pub attachment_id: String,
    pub force: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateNetworkInterfaceResponse {
    network_interface: NetworkInterface,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeNetworkInterfacesResponse {
    #[serde(default)]
    network_interfaces: Vec<NetworkInterface>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AttachNetworkInterfaceResponse {
    attachment_id: String,
}

pub struct NetworkInterfacesApi<'a> {
    client: &'a Client,
}

impl<'a> NetworkInterfacesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        input: &CreateNetworkInterfaceInput,
    ) -> Result<NetworkInterface, ApiError> {
        let response: CreateNetworkInterfaceResponse = self
            .client
            .call("CreateNetworkInterface", input.to_params())
            .await?;
        Ok(response.network_interface)
    }

    pub async fn describe(&self, ids: &[String]) -> Result<Vec<NetworkInterface>, ApiError> {
        let params = QueryParams::new().add_list("NetworkInterfaceId", ids);
        let response: DescribeNetworkInterfacesResponse = self
            .client
            .call("DescribeNetworkInterfaces", params)
            .await?;
        Ok(response.network_interfaces)
    }

    pub async fn modify_attribute(
        &self,
        input: &ModifyNetworkInterfaceAttributeInput,
    ) -> Result<(), ApiError> {
        let params = QueryParams::new()
            .add("NetworkInterfaceId", &input.network_interface_id)
            .add_list("SecurityGroupId", &input.groups);
        self.client
            .call_unit("ModifyNetworkInterfaceAttribute", params)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let params = QueryParams::new().add("NetworkInterfaceId", id);
        self.client.call_unit("DeleteNetworkInterface", params).await
    }

    /// Returns the new attachment id
    pub async fn attach(&self, input: &AttachNetworkInterfaceInput) -> Result<String, ApiError> {
        let params = QueryParams::new()
            .add("DeviceIndex", input.device_index)
            .add("InstanceId", &input.instance_id)
            .add("NetworkInterfaceId", &input.network_interface_id);
        let response: AttachNetworkInterfaceResponse = self
            .client
            .call("AttachNetworkInterface", params)
            .await?;
        Ok(response.attachment_id)
    }

    pub async fn detach(&self, input: &DetachNetworkInterfaceInput) -> Result<(), ApiError> {
        let params = QueryParams::new()
            .add("AttachmentId", &input.attachment_id)
            .add("Force", input.force);
        self.client.call_unit("DetachNetworkInterface", params).await
    }
}

//! In-memory [`Ec2Api`] that records every call, for resource tests

use super::error::NETWORK_INTERFACE_NOT_FOUND;
use super::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

#[derive(Default)]
struct FakeState {
    interfaces: BTreeMap<String, NetworkInterface>,
    next_id: u32,
    calls: Vec<String>,
    attaches: Vec<AttachNetworkInterfaceInput>,
    detaches: Vec<DetachNetworkInterfaceInput>,
    failures: HashMap<String, String>,
}

#[derive(Default)]
pub struct FakeEc2 {
    state: Mutex<FakeState>,
}

impl FakeEc2 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later call to `action` fail with the EC2 error `code`
    pub fn fail_on(&self, action: &str, code: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(action.to_string(), code.to_string());
    }

    pub fn insert(&self, eni: NetworkInterface) {
        self.state
            .lock()
            .unwrap()
            .interfaces
            .insert(eni.network_interface_id.clone(), eni);
    }

    pub fn interface(&self, id: &str) -> Option<NetworkInterface> {
        self.state.lock().unwrap().interfaces.get(id).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        let mut state = self.state.lock().unwrap();
        state.calls.clear();
        state.attaches.clear();
        state.detaches.clear();
    }

    pub fn attaches(&self) -> Vec<AttachNetworkInterfaceInput> {
        self.state.lock().unwrap().attaches.clone()
    }

    pub fn detaches(&self) -> Vec<DetachNetworkInterfaceInput> {
        self.state.lock().unwrap().detaches.clone()
    }

    fn begin(&self, action: &str) -> Result<std::sync::MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(action.to_string());
        if let Some(code) = state.failures.get(action).cloned() {
            return Err(service_error(&code));
        }
        Ok(state)
    }
}

fn service_error(code: &str) -> ApiError {
    ApiError::Service {
        status: 400,
        code: code.to_string(),
        message: format!("injected {}", code),
    }
}

fn not_found(id: &str) -> ApiError {
    ApiError::Service {
        status: 400,
        code: NETWORK_INTERFACE_NOT_FOUND.to_string(),
        message: format!("The networkInterface ID '{}' does not exist", id),
    }
}

#[async_trait]
impl Ec2Api for FakeEc2 {
    async fn create_network_interface(
        &self,
        input: &CreateNetworkInterfaceInput,
    ) -> Result<NetworkInterface, ApiError> {
        let mut state = self.begin("CreateNetworkInterface")?;
        state.next_id += 1;
        let id = format!("eni-{:08x}", state.next_id);

        let groups = if input.groups.is_empty() {
            vec!["sg-default".to_string()]
        } else {
            input.groups.clone()
        };
        let private_ip_addresses = if input.private_ip_addresses.is_empty() {
            vec![NetworkInterfacePrivateIpAddress {
                private_ip_address: Some("10.0.0.100".to_string()),
                primary: Some(true),
            }]
        } else {
            input
                .private_ip_addresses
                .iter()
                .map(|spec| NetworkInterfacePrivateIpAddress {
                    private_ip_address: Some(spec.private_ip_address.clone()),
                    primary: Some(spec.primary),
                })
                .collect()
        };

        let eni = NetworkInterface {
            network_interface_id: id.clone(),
            subnet_id: Some(input.subnet_id.clone()),
            status: Some("available".to_string()),
            private_ip_addresses,
            groups: groups
                .into_iter()
                .map(|g| GroupIdentifier {
                    group_id: Some(g),
                    group_name: None,
                })
                .collect(),
            ..Default::default()
        };
        state.interfaces.insert(id, eni.clone());
        Ok(eni)
    }

    async fn describe_network_interfaces(
        &self,
        ids: &[String],
    ) -> Result<Vec<NetworkInterface>, ApiError> {
        let state = self.begin("DescribeNetworkInterfaces")?;
        ids.iter()
            .map(|id| state.interfaces.get(id).cloned().ok_or_else(|| not_found(id)))
            .collect()
    }

    async fn modify_network_interface_attribute(
        &self,
        input: &ModifyNetworkInterfaceAttributeInput,
    ) -> Result<(), ApiError> {
        let mut state = self.begin("ModifyNetworkInterfaceAttribute")?;
        let eni = state
            .interfaces
            .get_mut(&input.network_interface_id)
            .ok_or_else(|| not_found(&input.network_interface_id))?;
        eni.groups = input
            .groups
            .iter()
            .map(|g| GroupIdentifier {
                group_id: Some(g.clone()),
                group_name: None,
            })
            .collect();
        Ok(())
    }

    async fn delete_network_interface(&self, id: &str) -> Result<(), ApiError> {
        let mut state = self.begin("DeleteNetworkInterface")?;
        state
            .interfaces
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    async fn attach_network_interface(
        &self,
        input: &AttachNetworkInterfaceInput,
    ) -> Result<String, ApiError> {
        let mut state = self.begin("AttachNetworkInterface")?;
        state.attaches.push(input.clone());
        state.next_id += 1;
        let attachment_id = format!("eni-attach-{:08x}", state.next_id);
        let eni = state
            .interfaces
            .get_mut(&input.network_interface_id)
            .ok_or_else(|| not_found(&input.network_interface_id))?;
        eni.attachment = Some(NetworkInterfaceAttachment {
            attachment_id: Some(attachment_id.clone()),
            instance_id: Some(input.instance_id.clone()),
            device_index: Some(input.device_index),
            status: Some("attached".to_string()),
        });
        Ok(attachment_id)
    }

    async fn detach_network_interface(
        &self,
        input: &DetachNetworkInterfaceInput,
    ) -> Result<(), ApiError> {
        let mut state = self.begin("DetachNetworkInterface")?;
        state.detaches.push(input.clone());
        let eni = state
            .interfaces
            .values_mut()
            .find(|eni| {
                eni.attachment
                    .as_ref()
                    .and_then(|a| a.attachment_id.as_deref())
                    == Some(input.attachment_id.as_str())
            })
            .ok_or_else(|| service_error("InvalidAttachmentID.NotFound"))?;
        eni.attachment = None;
        Ok(())
    }

    async fn create_tags(&self, resource_ids: &[String], tags: &[Tag]) -> Result<(), ApiError> {
        let mut state = self.begin("CreateTags")?;
        for id in resource_ids {
            let eni = state.interfaces.get_mut(id).ok_or_else(|| not_found(id))?;
            for tag in tags {
                eni.tag_set.retain(|t| t.key != tag.key);
                eni.tag_set.push(tag.clone());
            }
        }
        Ok(())
    }

    async fn delete_tags(&self, resource_ids: &[String], tags: &[Tag]) -> Result<(), ApiError> {
        let mut state = self.begin("DeleteTags")?;
        for id in resource_ids {
            let eni = state.interfaces.get_mut(id).ok_or_else(|| not_found(id))?;
            eni.tag_set.retain(|t| !tags.contains(t));
        }
        Ok(())
    }
}

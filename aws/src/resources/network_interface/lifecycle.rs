//! Create, read, update and delete of a network interface on typed values
//!
//! Each operation issues its API calls one after another. Update applies
//! attachment, security groups and tags in that order and stops at the first
//! failure; whatever was applied before the failure is reported back as
//! committed so the caller can persist it.

use super::convert::{addresses_from, flatten_attachment, group_ids_from, private_ip_specifications};
use super::error::NetworkInterfaceError;
use super::model::{NetworkInterfaceConfig, NetworkInterfaceState};
use crate::api::{
    AttachNetworkInterfaceInput, CreateNetworkInterfaceInput, DetachNetworkInterfaceInput,
    Ec2Api, ModifyNetworkInterfaceAttributeInput, NetworkInterface,
};
use crate::resources::tags::{diff_tags, tags_from};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommittedAttribute {
    Attachment,
    SecurityGroups,
    Tags,
}

impl CommittedAttribute {
    pub fn attribute_name(&self) -> &'static str {
        match self {
            CommittedAttribute::Attachment => "attachment",
            CommittedAttribute::SecurityGroups => "security_groups",
            CommittedAttribute::Tags => "tags",
        }
    }
}

#[derive(Debug)]
pub struct UpdateOutcome {
    /// Attributes applied before `result` was produced, in order
    pub committed: Vec<CommittedAttribute>,
    /// The refreshed state, `None` if the interface vanished meanwhile
    pub result: Result<Option<NetworkInterfaceState>, NetworkInterfaceError>,
}

impl UpdateOutcome {
    pub fn committed_names(&self) -> Vec<&'static str> {
        self.committed
            .iter()
            .map(CommittedAttribute::attribute_name)
            .collect()
    }
}

/// The interface exists once this is returned, whatever `update` says
#[derive(Debug)]
pub struct CreateOutcome {
    pub id: String,
    pub update: UpdateOutcome,
}

pub struct NetworkInterfaceLifecycle<'a> {
    api: &'a dyn Ec2Api,
}

impl<'a> NetworkInterfaceLifecycle<'a> {
    pub fn new(api: &'a dyn Ec2Api) -> Self {
        Self { api }
    }

    pub async fn create(
        &self,
        config: &NetworkInterfaceConfig,
    ) -> Result<CreateOutcome, NetworkInterfaceError> {
        let private_ips: Vec<String> = config.private_ips.iter().cloned().collect();
        let input = CreateNetworkInterfaceInput {
            subnet_id: config.subnet_id.clone(),
            groups: config
                .security_groups
                .iter()
                .flatten()
                .cloned()
                .collect(),
            private_ip_addresses: private_ip_specifications(&private_ips),
            description: None,
        };

        tracing::debug!("Creating network interface: {:?}", input);
        let eni = self
            .api
            .create_network_interface(&input)
            .await
            .map_err(NetworkInterfaceError::CreateFailed)?;

        let id = eni.network_interface_id;
        tracing::info!("ENI ID: {}", id);

        let created = NetworkInterfaceState::created(&id, config);
        let update = self.update(&created, config).await;
        Ok(CreateOutcome { id, update })
    }

    pub async fn read(&self, id: &str) -> Result<Option<NetworkInterfaceState>, NetworkInterfaceError> {
        tracing::debug!("Reading network interface {}", id);

        let enis = match self.api.describe_network_interfaces(&[id.to_string()]).await {
            Ok(enis) => enis,
            Err(e) if e.is_not_found() => {
                tracing::warn!("ENI {} not found, removing from state", id);
                return Ok(None);
            }
            Err(source) => {
                return Err(NetworkInterfaceError::ReadFailed {
                    id: id.to_string(),
                    source,
                })
            }
        };

        let [eni]: [NetworkInterface; 1] =
            enis.try_into()
                .map_err(|enis: Vec<NetworkInterface>| NetworkInterfaceError::NotFoundInResponse {
                    id: id.to_string(),
                    count: enis.len(),
                })?;

        Ok(Some(NetworkInterfaceState {
            id: eni.network_interface_id,
            subnet_id: eni.subnet_id.unwrap_or_default(),
            private_ips: addresses_from(&eni.private_ip_addresses),
            security_groups: group_ids_from(&eni.groups),
            attachment: flatten_attachment(eni.attachment.as_ref()),
            tags: tags_from(&eni.tag_set),
        }))
    }

    pub async fn update(
        &self,
        current: &NetworkInterfaceState,
        desired: &NetworkInterfaceConfig,
    ) -> UpdateOutcome {
        let mut committed = Vec::new();
        let result = match self.apply(current, desired, &mut committed).await {
            Ok(()) => self.read(&current.id).await,
            Err(e) => Err(e),
        };
        UpdateOutcome { committed, result }
    }

    async fn apply(
        &self,
        current: &NetworkInterfaceState,
        desired: &NetworkInterfaceConfig,
        committed: &mut Vec<CommittedAttribute>,
    ) -> Result<(), NetworkInterfaceError> {
        let id = &current.id;

        if current.attachment_spec() != desired.attachment {
            if let Some(old) = &current.attachment {
                tracing::debug!("Detaching {} from {}", old.attachment_id, id);
                let input = DetachNetworkInterfaceInput {
                    attachment_id: old.attachment_id.clone(),
                    force: true,
                };
                self.api
                    .detach_network_interface(&input)
                    .await
                    .map_err(|source| NetworkInterfaceError::DetachFailed {
                        attachment_id: old.attachment_id.clone(),
                        source,
                    })?;
            }

            if let Some(new) = &desired.attachment {
                tracing::debug!(
                    "Attaching {} to {} at device index {}",
                    id,
                    new.instance,
                    new.device_index
                );
                let input = AttachNetworkInterfaceInput {
                    network_interface_id: id.clone(),
                    instance_id: new.instance.clone(),
                    device_index: new.device_index,
                };
                let attachment_id = self
                    .api
                    .attach_network_interface(&input)
                    .await
                    .map_err(|source| NetworkInterfaceError::AttachFailed {
                        instance: new.instance.clone(),
                        source,
                    })?;
                tracing::info!("Attached {} to {} as {}", id, new.instance, attachment_id);
            }

            committed.push(CommittedAttribute::Attachment);
        }

        if let Some(groups) = &desired.security_groups {
            if *groups != current.security_group_set() {
                tracing::debug!("Setting security groups of {} to {:?}", id, groups);
                let input = ModifyNetworkInterfaceAttributeInput {
                    network_interface_id: id.clone(),
                    groups: groups.iter().cloned().collect(),
                };
                self.api
                    .modify_network_interface_attribute(&input)
                    .await
                    .map_err(NetworkInterfaceError::SecurityGroupUpdateFailed)?;
                committed.push(CommittedAttribute::SecurityGroups);
            }
        }

        if desired.tags != current.tags {
            let (remove, create) = diff_tags(&current.tags, &desired.tags);
            let ids = [id.clone()];
            if !remove.is_empty() {
                tracing::debug!("Removing tags from {}: {:?}", id, remove);
                self.api
                    .delete_tags(&ids, &remove)
                    .await
                    .map_err(NetworkInterfaceError::TagsUpdateFailed)?;
            }
            if !create.is_empty() {
                tracing::debug!("Creating tags on {}: {:?}", id, create);
                self.api
                    .create_tags(&ids, &create)
                    .await
                    .map_err(NetworkInterfaceError::TagsUpdateFailed)?;
            }
            committed.push(CommittedAttribute::Tags);
        }

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), NetworkInterfaceError> {
        tracing::debug!("Deleting ENI: {}", id);
        self.api
            .delete_network_interface(id)
            .await
            .map_err(|source| NetworkInterfaceError::DeleteFailed {
                id: id.to_string(),
                source,
            })?;
        tracing::info!("Deleted ENI {}", id);
        Ok(())
    }
}

//! Conversions between API structures and the resource model

use super::model::ObservedAttachment;
use crate::api::{
    GroupIdentifier, NetworkInterfaceAttachment, NetworkInterfacePrivateIpAddress,
    PrivateIpAddressSpecification,
};

pub fn addresses_from(addresses: &[NetworkInterfacePrivateIpAddress]) -> Vec<String> {
    addresses
        .iter()
        .filter_map(|a| a.private_ip_address.clone())
        .collect()
}

pub fn group_ids_from(groups: &[GroupIdentifier]) -> Vec<String> {
    groups.iter().filter_map(|g| g.group_id.clone()).collect()
}

/// The first address becomes the primary one
pub fn private_ip_specifications(addresses: &[String]) -> Vec<PrivateIpAddressSpecification> {
    addresses
        .iter()
        .enumerate()
        .map(|(idx, address)| PrivateIpAddressSpecification {
            private_ip_address: address.clone(),
            primary: idx == 0,
        })
        .collect()
}

/// An attachment missing its instance or attachment id is reported as none
pub fn flatten_attachment(
    attachment: Option<&NetworkInterfaceAttachment>,
) -> Option<ObservedAttachment> {
    let attachment = attachment?;
    Some(ObservedAttachment {
        instance: attachment.instance_id.clone()?,
        device_index: attachment.device_index.unwrap_or_default(),
        attachment_id: attachment.attachment_id.clone()?,
    })
}

//! Typed configuration and state for `aws_network_interface`
//!
//! Values cross the framework boundary as [`DynamicValue`]s; they are parsed
//! into these structs once and everything past that point works on the typed
//! form.

use indexmap::IndexSet;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use tfplug::types::{into_optional, AttributePath, Diagnostic, Dynamic, DynamicValue};

/// Desired attachment of the interface to an instance.
///
/// The pair is the attachment's identity: changing either field replaces the
/// attachment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentSpec {
    pub instance: String,
    pub device_index: i64,
}

impl AttachmentSpec {
    /// Set-membership hash of the attachment, stable across runs.
    ///
    /// Change detection compares the pair itself (`PartialEq`), not this hash.
    pub fn set_hash(&self) -> u32 {
        let mut hasher = Sha256::new();
        hasher.update(self.instance.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.device_index.to_le_bytes());
        let digest = hasher.finalize();
        u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
    }
}

/// Attachment as observed on the interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedAttachment {
    pub instance: String,
    pub device_index: i64,
    pub attachment_id: String,
}

impl ObservedAttachment {
    pub fn spec(&self) -> AttachmentSpec {
        AttachmentSpec {
            instance: self.instance.clone(),
            device_index: self.device_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkInterfaceConfig {
    pub subnet_id: String,
    /// The first address is the primary one
    pub private_ips: IndexSet<String>,
    /// `None` leaves whatever groups the cloud assigned. Never `Some` empty.
    pub security_groups: Option<BTreeSet<String>>,
    pub attachment: Option<AttachmentSpec>,
    pub tags: BTreeMap<String, String>,
}

impl NetworkInterfaceConfig {
    /// Parses a fully known configuration
    pub fn from_dynamic(config: &DynamicValue) -> Result<Self, Vec<Diagnostic>> {
        let mut reader = ConfigReader::new(config, false);
        let parsed = reader.read_config();
        if reader.diagnostics.is_empty() {
            Ok(parsed)
        } else {
            Err(reader.diagnostics)
        }
    }

    /// Checks a configuration that may still contain unknown values
    pub fn validate(config: &DynamicValue) -> Vec<Diagnostic> {
        let mut reader = ConfigReader::new(config, true);
        reader.read_config();
        reader.diagnostics
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkInterfaceState {
    pub id: String,
    pub subnet_id: String,
    /// In the order the API reports them
    pub private_ips: Vec<String>,
    pub security_groups: Vec<String>,
    pub attachment: Option<ObservedAttachment>,
    pub tags: BTreeMap<String, String>,
}

impl NetworkInterfaceState {
    /// State of an interface that was just created and has nothing applied
    /// to it yet beyond its creation parameters.
    pub fn created(id: &str, config: &NetworkInterfaceConfig) -> Self {
        Self {
            id: id.to_string(),
            subnet_id: config.subnet_id.clone(),
            private_ips: config.private_ips.iter().cloned().collect(),
            ..Default::default()
        }
    }

    pub fn security_group_set(&self) -> BTreeSet<String> {
        self.security_groups.iter().cloned().collect()
    }

    pub fn attachment_spec(&self) -> Option<AttachmentSpec> {
        self.attachment.as_ref().map(ObservedAttachment::spec)
    }

    pub fn to_dynamic(&self) -> DynamicValue {
        let attachment = match &self.attachment {
            Some(a) => Dynamic::List(vec![Dynamic::Map(BTreeMap::from([
                ("instance".to_string(), Dynamic::from(a.instance.clone())),
                ("device_index".to_string(), Dynamic::Number(a.device_index as f64)),
                ("attachment_id".to_string(), Dynamic::from(a.attachment_id.clone())),
            ]))]),
            None => Dynamic::Null,
        };
        let tags = if self.tags.is_empty() {
            Dynamic::Null
        } else {
            Dynamic::Map(
                self.tags
                    .iter()
                    .map(|(k, v)| (k.clone(), Dynamic::from(v.clone())))
                    .collect(),
            )
        };

        DynamicValue::new(Dynamic::Map(BTreeMap::from([
            ("id".to_string(), Dynamic::from(self.id.clone())),
            ("subnet_id".to_string(), Dynamic::from(self.subnet_id.clone())),
            ("private_ips".to_string(), Dynamic::from(self.private_ips.clone())),
            (
                "security_groups".to_string(),
                Dynamic::from(self.security_groups.clone()),
            ),
            ("attachment".to_string(), attachment),
            ("tags".to_string(), tags),
        ])))
    }

    /// Reads persisted state. Only `id` is mandatory; anything else missing
    /// is treated as empty.
    pub fn from_dynamic(state: &DynamicValue) -> tfplug::Result<Self> {
        let id = state.get_string(&AttributePath::new("id"))?;
        let subnet_id = optional(state.get_string(&AttributePath::new("subnet_id")))?
            .unwrap_or_default();
        let private_ips = optional(state.get_string_list(&AttributePath::new("private_ips")))?
            .unwrap_or_default();
        let security_groups =
            optional(state.get_string_list(&AttributePath::new("security_groups")))?
                .unwrap_or_default();
        let tags = optional(state.get_string_map(&AttributePath::new("tags")))?
            .unwrap_or_default();

        let element = AttributePath::new("attachment").index(0);
        let attachment = match state.get(&element)? {
            Dynamic::Map(_) => Some(ObservedAttachment {
                instance: state.get_string(&element.clone().attribute("instance"))?,
                device_index: state.get_number(&element.clone().attribute("device_index"))?
                    as i64,
                attachment_id: optional(
                    state.get_string(&element.clone().attribute("attachment_id")),
                )?
                .unwrap_or_default(),
            }),
            _ => None,
        };

        Ok(Self {
            id,
            subnet_id,
            private_ips,
            security_groups,
            attachment,
            tags,
        })
    }
}

/// Like [`tfplug::types::into_optional`], but unknown values (which surface
/// as type mismatches) also count as absent.
fn optional<T>(result: tfplug::Result<T>) -> tfplug::Result<Option<T>> {
    match result {
        Err(tfplug::TfplugError::TypeMismatch { actual, .. }) if actual == "unknown" => Ok(None),
        other => into_optional(other),
    }
}

/// Walks a configuration collecting diagnostics instead of stopping at the
/// first problem.
struct ConfigReader<'a> {
    config: &'a DynamicValue,
    allow_unknown: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ConfigReader<'a> {
    fn new(config: &'a DynamicValue, allow_unknown: bool) -> Self {
        Self {
            config,
            allow_unknown,
            diagnostics: Vec::new(),
        }
    }

    fn error(&mut self, path: &AttributePath, summary: &str, detail: String) {
        self.diagnostics
            .push(Diagnostic::error(summary, detail).with_attribute(path.clone()));
    }

    /// The value at `path`, or `None` when it is null or (during validation)
    /// not yet known.
    fn value(&mut self, path: &AttributePath) -> Option<&'a Dynamic> {
        let config = self.config;
        match config.get(path) {
            Ok(Dynamic::Null) => None,
            Ok(Dynamic::Unknown) if self.allow_unknown => None,
            Ok(Dynamic::Unknown) => {
                self.error(
                    path,
                    "Value not yet known",
                    format!("{} must be known before it can be applied", path),
                );
                None
            }
            Ok(value) => Some(value),
            Err(e) => {
                self.error(path, "Invalid configuration", e.to_string());
                None
            }
        }
    }

    fn is_unknown(&self, path: &AttributePath) -> bool {
        matches!(self.config.get(path), Ok(Dynamic::Unknown))
    }

    fn string(&mut self, path: &AttributePath, value: &Dynamic) -> Option<String> {
        match value {
            Dynamic::String(s) => Some(s.clone()),
            Dynamic::Unknown if self.allow_unknown => None,
            other => {
                self.error(
                    path,
                    "Invalid attribute type",
                    format!("{} must be a string, got {}", path, other.type_name()),
                );
                None
            }
        }
    }

    fn required_string(&mut self, path: &AttributePath) -> String {
        if self.allow_unknown && self.is_unknown(path) {
            return String::new();
        }
        match self.value(path) {
            Some(value) => self.string(path, value).unwrap_or_default(),
            None => {
                self.error(
                    path,
                    "Missing required attribute",
                    format!("The attribute {} is required", path),
                );
                String::new()
            }
        }
    }

    fn string_list(&mut self, path: &AttributePath) -> Option<Vec<String>> {
        let value = self.value(path)?;
        let Some(items) = value.as_list() else {
            self.error(
                path,
                "Invalid attribute type",
                format!("{} must be a set of strings, got {}", path, value.type_name()),
            );
            return None;
        };

        let mut out = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            if let Some(s) = self.string(&path.clone().index(idx as i64), item) {
                out.push(s);
            }
        }
        Some(out)
    }

    fn read_config(&mut self) -> NetworkInterfaceConfig {
        let subnet_id = self.required_string(&AttributePath::new("subnet_id"));
        let private_ips = self
            .string_list(&AttributePath::new("private_ips"))
            .unwrap_or_default()
            .into_iter()
            .collect();
        // EC2 cannot set an empty group list, so `[]` keeps the current groups
        let security_groups = self
            .string_list(&AttributePath::new("security_groups"))
            .filter(|groups| !groups.is_empty())
            .map(|groups| groups.into_iter().collect());
        let attachment = self.read_attachment();
        let tags = self.read_tags();

        NetworkInterfaceConfig {
            subnet_id,
            private_ips,
            security_groups,
            attachment,
            tags,
        }
    }

    fn read_attachment(&mut self) -> Option<AttachmentSpec> {
        let path = AttributePath::new("attachment");
        let value = self.value(&path)?;
        let Some(blocks) = value.as_list() else {
            self.error(
                &path,
                "Invalid attribute type",
                format!("attachment must be a block, got {}", value.type_name()),
            );
            return None;
        };

        match blocks.len() {
            0 => return None,
            1 => {}
            n => {
                self.error(
                    &path,
                    "Too many attachment blocks",
                    format!("At most one attachment is allowed, got {}", n),
                );
                return None;
            }
        }

        let element = path.index(0);
        let instance = self.required_string(&element.clone().attribute("instance"));
        let device_index = self.device_index(&element.attribute("device_index"))?;

        Some(AttachmentSpec {
            instance,
            device_index,
        })
    }

    fn device_index(&mut self, path: &AttributePath) -> Option<i64> {
        if self.allow_unknown && self.is_unknown(path) {
            return None;
        }
        let Some(value) = self.value(path) else {
            self.error(
                path,
                "Missing required attribute",
                format!("The attribute {} is required", path),
            );
            return None;
        };

        match value.as_f64() {
            Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= i64::MAX as f64 => Some(n as i64),
            Some(n) => {
                self.error(
                    path,
                    "Invalid device index",
                    format!("device_index must be a non-negative integer, got {}", n),
                );
                None
            }
            None => {
                self.error(
                    path,
                    "Invalid attribute type",
                    format!("{} must be a number, got {}", path, value.type_name()),
                );
                None
            }
        }
    }

    fn read_tags(&mut self) -> BTreeMap<String, String> {
        let path = AttributePath::new("tags");
        let Some(value) = self.value(&path) else {
            return BTreeMap::new();
        };
        let Some(entries) = value.as_map() else {
            self.error(
                &path,
                "Invalid attribute type",
                format!("tags must be a map of strings, got {}", value.type_name()),
            );
            return BTreeMap::new();
        };

        let mut tags = BTreeMap::new();
        for (key, item) in entries {
            if let Some(s) = self.string(&path.clone().key(key), item) {
                tags.insert(key.clone(), s);
            }
        }
        tags
    }
}

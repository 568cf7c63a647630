//! Terraform provider managing EC2 network interfaces
//!
//! The crate is a library: the host process that serves the plugin protocol
//! calls [`logging::init_tracing`] once at startup, then drives
//! [`AwsProvider`] and the resources it hands out.

pub mod api;
pub mod logging;
pub mod provider_data;
pub mod resources;

pub use provider_data::AwsProviderData;

use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::provider::{ConfigureProviderRequest, ConfigureProviderResponse, Provider, ResourceFactory};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

pub const DEFAULT_REGION: &str = "us-east-1";

/// Provider settings after applying environment fallbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub region: String,
    pub endpoint: String,
    pub token: Option<String>,
    pub insecure: bool,
}

impl ProviderSettings {
    /// Fails when no endpoint is set in config or environment. The client
    /// speaks bearer-token JSON, so there is no usable public default.
    pub fn resolve(config: &DynamicValue) -> Result<Self, Diagnostic> {
        let string = |name: &str, env: &str| {
            config
                .get_string(&AttributePath::new(name))
                .ok()
                .or_else(|| std::env::var(env).ok())
                .filter(|v| !v.is_empty())
        };

        let region = string("region", "AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string());
        let endpoint = string("endpoint", "AWS_EC2_ENDPOINT").ok_or_else(|| {
            Diagnostic::error(
                "Missing endpoint",
                "Set the endpoint attribute or AWS_EC2_ENDPOINT",
            )
            .with_attribute(AttributePath::new("endpoint"))
        })?;
        let token = string("token", "AWS_EC2_TOKEN");
        let insecure = config
            .get_bool(&AttributePath::new("insecure"))
            .ok()
            .or_else(|| {
                std::env::var("AWS_EC2_INSECURE")
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok())
            })
            .unwrap_or(false);

        Ok(Self {
            region,
            endpoint,
            token,
            insecure,
        })
    }
}

#[derive(Default)]
pub struct AwsProvider {
    provider_data: Option<AwsProviderData>,
}

impl AwsProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Provider for AwsProvider {
    fn type_name(&self) -> &str {
        "aws"
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .attribute(
                AttributeBuilder::new("region", AttributeType::String)
                    .description("AWS region (or AWS_REGION), defaults to us-east-1")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("endpoint", AttributeType::String)
                    .description("EC2 endpoint URL (or AWS_EC2_ENDPOINT), required")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("token", AttributeType::String)
                    .description("Bearer token sent with every request (or AWS_EC2_TOKEN)")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("insecure", AttributeType::Bool)
                    .description("Skip TLS verification (or AWS_EC2_INSECURE)")
                    .optional()
                    .build(),
            )
            .build()
    }

    async fn configure(&mut self, request: ConfigureProviderRequest) -> ConfigureProviderResponse {
        let settings = match ProviderSettings::resolve(&request.config) {
            Ok(settings) => settings,
            Err(diag) => {
                return ConfigureProviderResponse {
                    diagnostics: vec![diag],
                    provider_data: None,
                }
            }
        };
        tracing::debug!(
            "Configuring provider for region {} at {}",
            settings.region,
            settings.endpoint
        );

        match api::Client::new(&settings.endpoint, settings.token.as_deref(), settings.insecure) {
            Ok(client) => {
                let data = AwsProviderData::new(client);
                self.provider_data = Some(data.clone());
                let provider_data: Arc<dyn Any + Send + Sync> = Arc::new(data);
                ConfigureProviderResponse {
                    diagnostics: vec![],
                    provider_data: Some(provider_data),
                }
            }
            Err(e) => ConfigureProviderResponse {
                diagnostics: vec![Diagnostic::error(
                    format!("Failed to create API client: {}", e),
                    "Check the endpoint setting or AWS_EC2_ENDPOINT",
                )
                .with_attribute(AttributePath::new("endpoint"))],
                provider_data: None,
            },
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();
        factories.insert(
            resources::network_interface::TYPE_NAME.to_string(),
            Box::new(|| {
                Box::new(resources::NetworkInterfaceResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories
    }
}

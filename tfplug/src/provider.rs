//! Provider trait
//!
//! Providers are configured once and then hand out fresh resource instances
//! through factories; each instance is configured with the provider data
//! before use.

use crate::resource::ResourceWithConfigure;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

pub type ResourceFactory = Box<dyn Fn() -> Box<dyn ResourceWithConfigure> + Send + Sync>;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name, the prefix of every resource type name
    fn type_name(&self) -> &str;

    fn schema(&self) -> Schema;

    async fn configure(&mut self, request: ConfigureProviderRequest) -> ConfigureProviderResponse;

    fn resources(&self) -> HashMap<String, ResourceFactory>;
}

pub struct ConfigureProviderRequest {
    pub terraform_version: String,
    pub config: DynamicValue,
}

pub struct ConfigureProviderResponse {
    pub diagnostics: Vec<Diagnostic>,
    /// Passed to every resource through ConfigureResourceRequest
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
}

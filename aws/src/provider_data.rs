//! Provider data structure passed to resources

use crate::api::Ec2Api;
use std::sync::Arc;

#[derive(Clone)]
pub struct AwsProviderData {
    pub client: Arc<dyn Ec2Api>,
}

impl AwsProviderData {
    pub fn new(client: impl Ec2Api + 'static) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

//! Resource tagging actions

use super::client::Client;
use super::common::QueryParams;
use super::error::ApiError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

fn tag_params(resource_ids: &[String], tags: &[Tag]) -> QueryParams {
    let mut params = QueryParams::new().add_list("ResourceId", resource_ids);
    for (idx, tag) in tags.iter().enumerate() {
        params = params
            .add_member("Tag", idx, "Key", &tag.key)
            .add_member("Tag", idx, "Value", &tag.value);
    }
    params
}

pub struct TagsApi<'a> {
    client: &'a Client,
}

impl<'a> TagsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, resource_ids: &[String], tags: &[Tag]) -> Result<(), ApiError> {
        self.client
            .call_unit("CreateTags", tag_params(resource_ids, tags))
            .await
    }

    /// Removes tags whose key and value both match
    pub async fn delete(&self, resource_ids: &[String], tags: &[Tag]) -> Result<(), ApiError> {
        self.client
            .call_unit("DeleteTags", tag_params(resource_ids, tags))
            .await
    }
}

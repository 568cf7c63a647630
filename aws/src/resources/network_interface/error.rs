use crate::api::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkInterfaceError {
    #[error("Error creating ENI: {0}")]
    CreateFailed(#[source] ApiError),

    #[error("Error retrieving ENI {id}: {source}")]
    ReadFailed {
        id: String,
        #[source]
        source: ApiError,
    },

    #[error("Unable to find ENI {id}: expected 1 interface, got {count}")]
    NotFoundInResponse { id: String, count: usize },

    #[error("Error detaching ENI attachment {attachment_id}: {source}")]
    DetachFailed {
        attachment_id: String,
        #[source]
        source: ApiError,
    },

    #[error("Error attaching ENI to instance {instance}: {source}")]
    AttachFailed {
        instance: String,
        #[source]
        source: ApiError,
    },

    #[error("Failure updating ENI security groups: {0}")]
    SecurityGroupUpdateFailed(#[source] ApiError),

    #[error("Error updating ENI tags: {0}")]
    TagsUpdateFailed(#[source] ApiError),

    #[error("Error deleting ENI {id}: {source}")]
    DeleteFailed {
        id: String,
        #[source]
        source: ApiError,
    },
}

impl NetworkInterfaceError {
    /// Short summary for diagnostics
    pub fn summary(&self) -> &'static str {
        match self {
            NetworkInterfaceError::CreateFailed(_) => "Error creating ENI",
            NetworkInterfaceError::ReadFailed { .. }
            | NetworkInterfaceError::NotFoundInResponse { .. } => "Error retrieving ENI",
            NetworkInterfaceError::DetachFailed { .. } => "Error detaching ENI",
            NetworkInterfaceError::AttachFailed { .. } => "Error attaching ENI",
            NetworkInterfaceError::SecurityGroupUpdateFailed(_)
            | NetworkInterfaceError::TagsUpdateFailed(_) => "Failure updating ENI",
            NetworkInterfaceError::DeleteFailed { .. } => "Error deleting ENI",
        }
    }
}

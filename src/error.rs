use thiserror::Error;

use crate::resource::ServiceKind;

pub type Result<T> = std::result::Result<T, PostureError>;

#[derive(Error, Debug)]
pub enum PostureError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Listing error in resource group {resource_group}: {message}")]
    Listing {
        resource_group: String,
        message: String,
    },

    #[error("Diagnostic settings lookup failed for {resource_id}: {message}")]
    Diagnostics {
        resource_id: String,
        message: String,
    },

    #[error("Private endpoint listing failed: {0}")]
    PrivateEndpoints(String),

    #[error("Duplicate rule in {rule_set} rule set: {id}")]
    DuplicateRule { rule_set: ServiceKind, id: String },

    #[error("Review of {service} in resource group {resource_group} failed: {source}")]
    Review {
        service: ServiceKind,
        resource_group: String,
        #[source]
        source: Box<PostureError>,
    },

    #[error("Snapshot error in {path}: {message}")]
    Snapshot { path: String, message: String },

    #[error("Output error: {0}")]
    Output(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PostureError {
    /// Wrap an analyzer failure with the service and resource group it came from.
    pub fn review(service: ServiceKind, resource_group: &str, source: PostureError) -> Self {
        Self::Review {
            service,
            resource_group: resource_group.to_string(),
            source: Box::new(source),
        }
    }

    pub fn is_diagnostics(&self) -> bool {
        matches!(self, Self::Diagnostics { .. })
    }

    pub fn exit_code(&self) -> i32 {
        2
    }
}

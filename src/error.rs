//! Error and result types shared across the crate.
//!
//! Fetch failures are coarse: whatever went wrong (transport,
//! HTTP status, undecodable body) the user sees one generic message. The
//! status and underlying cause are kept for logging.

use reqwest::StatusCode;
use std::fmt::{Display, Formatter};

/// Application-level result used by the binary and config plumbing.
pub type Result<T> = anyhow::Result<T>;

/// What a fetch asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    User,
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Users => f.write_str("users"),
            Resource::User => f.write_str("user"),
        }
    }
}

/// The single error kind surfaced by the data-access and query layers.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Failed to fetch {resource}")]
pub struct FetchError {
    resource: Resource,
    status: Option<StatusCode>,
    cause: Option<String>,
}

impl FetchError {
    /// A failure with no further detail.
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            status: None,
            cause: None,
        }
    }

    /// The server answered with a non-success status.
    pub fn status(resource: Resource, status: StatusCode) -> Self {
        Self {
            resource,
            status: Some(status),
            cause: None,
        }
    }

    /// The request never produced a usable response, or its body did not decode.
    pub fn cause(resource: Resource, cause: impl Display) -> Self {
        Self {
            resource,
            status: None,
            cause: Some(cause.to_string()),
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn http_status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Underlying cause, for logs. Never shown in place of the generic message.
    pub fn detail(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

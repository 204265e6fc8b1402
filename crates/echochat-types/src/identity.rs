//! Device identity type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Anonymous identifier for this device's local storage.
///
/// Scopes data on the remote session store. It is a correlation key only
/// and must never be used for authentication or authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl DeviceId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

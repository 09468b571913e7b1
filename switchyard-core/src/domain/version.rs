//! Deployed version models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for one deployed version's routing record within a
/// domain, conventionally `<stack>-<version>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(pub String);

impl VersionId {
    /// View the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for VersionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One deployed version of a service stack as known to the version
/// registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackVersion {
    /// Name of the stack this version belongs to.
    pub stack_name: String,
    /// Human-readable version label, e.g. `"42"` or `"cd871"`.
    pub version: String,
    /// Domain the version serves traffic on, if any.
    pub domain: Option<String>,
    /// DNS name of the version's load balancer, if any.
    pub lb_endpoint: Option<String>,
}

impl StackVersion {
    /// The routing-record set identifier for this version.
    pub fn identifier(&self) -> VersionId {
        VersionId(format!("{}-{}", self.stack_name, self.version))
    }

    /// The fully qualified DNS name of the version's domain (with the
    /// trailing dot used by record sets), if the version has a domain.
    pub fn dns_name(&self) -> Option<String> {
        self.domain.as_ref().map(|d| format!("{d}."))
    }
}

//! Core types for route management.
//!
//! This module contains the data structures shared by the merge engine,
//! the field resolver, and the backends: the [`Route`] wire model, the
//! [`RouteDelta`] patch instruction, and the [`LocalDescriptor`] template.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Route configuration map (environment passed to the function).
pub type ConfigMap = BTreeMap<String, String>;

/// Route response headers, each with an ordered list of values.
pub type HeaderMap = BTreeMap<String, Vec<String>>;

/// How a route is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteType {
    /// Caller waits for the function's response.
    #[default]
    Sync,
    /// Call is queued and returns immediately.
    Async,
}

impl RouteType {
    /// Get the wire name of this type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Async => "async",
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RouteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sync" => Ok(Self::Sync),
            "async" => Ok(Self::Async),
            other => Err(format!("unknown route type '{other}' (expected sync or async)")),
        }
    }
}

/// A path-keyed binding of an HTTP path under an app to a container image.
///
/// Empty strings, zero integers and `None` mean "unset" and are omitted
/// from the serialized payload.
///
/// # Example
///
/// ```
/// use routekit::Route;
///
/// let route = Route::new("/hello", "fnproject/hello:0.0.1");
/// assert_eq!(route.path, "/hello");
/// assert!(route.config.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Owning application (filled in by the server).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_name: String,
    /// Route path, e.g. `/hello`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    /// Container image reference.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
    /// Memory limit in MiB.
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub memory: u64,
    /// Invocation type.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "deserialize_route_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub route_type: Option<RouteType>,
    /// Hot function IO format (`json`, `http`, ...).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    /// Maximum concurrency for hot functions.
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub max_concurrency: u32,
    /// Timeout in whole seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Configuration passed to the function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigMap>,
    /// Response headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HeaderMap>,
}

impl Route {
    /// Create a route with a path and image; everything else unset.
    #[must_use]
    pub fn new(path: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            image: image.into(),
            ..Self::default()
        }
    }
}

fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

fn deserialize_route_type<'de, D>(deserializer: D) -> Result<Option<RouteType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

// ============================================================================
// Deltas
// ============================================================================

/// Operation carried by a [`DeltaEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOp<V> {
    /// Insert or overwrite the key.
    Set(V),
    /// Remove the key if present.
    Delete,
}

/// A single change to a config or header map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaEntry<V> {
    /// Target key, taken literally.
    pub key: String,
    /// What to do with it.
    pub op: EntryOp<V>,
}

impl<V> DeltaEntry<V> {
    /// Entry that sets `key` to `value`.
    pub fn set(key: impl Into<String>, value: V) -> Self {
        Self {
            key: key.into(),
            op: EntryOp::Set(value),
        }
    }

    /// Entry that removes `key`.
    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            op: EntryOp::Delete,
        }
    }

    /// Convert a legacy `-key` literal into a delete, anything else into a set.
    ///
    /// ```
    /// use routekit::{DeltaEntry, EntryOp};
    ///
    /// let entry = DeltaEntry::from_prefixed("-DB_URL", String::new());
    /// assert_eq!(entry.key, "DB_URL");
    /// assert_eq!(entry.op, EntryOp::Delete);
    /// ```
    pub fn from_prefixed(key: &str, value: V) -> Self {
        match key.strip_prefix('-') {
            Some(stripped) => Self::delete(stripped),
            None => Self::set(key, value),
        }
    }
}

/// Partial route used as a patch instruction.
///
/// `None` scalars leave the current value unchanged. Config and header
/// changes are explicit [`DeltaEntry`] lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteDelta {
    /// New image reference.
    pub image: Option<String>,
    /// New memory limit in MiB.
    pub memory: Option<u64>,
    /// New invocation type.
    pub route_type: Option<RouteType>,
    /// New IO format.
    pub format: Option<String>,
    /// New max concurrency.
    pub max_concurrency: Option<u32>,
    /// New timeout in seconds. `Some(0)` is an explicit zero.
    pub timeout: Option<u64>,
    /// Config changes.
    pub config: Vec<DeltaEntry<String>>,
    /// Header changes.
    pub headers: Vec<DeltaEntry<Vec<String>>>,
}

impl RouteDelta {
    /// Create an empty delta.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a config set entry.
    pub fn set_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.push(DeltaEntry::set(key, value.into()));
        self
    }

    /// Add a config delete entry.
    pub fn unset_config(mut self, key: impl Into<String>) -> Self {
        self.config.push(DeltaEntry::delete(key));
        self
    }

    /// Add a header set entry.
    pub fn set_header(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.headers.push(DeltaEntry::set(name, values));
        self
    }

    /// Add a header delete entry.
    pub fn unset_header(mut self, name: impl Into<String>) -> Self {
        self.headers.push(DeltaEntry::delete(name));
        self
    }

    /// Whether applying this delta would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// ============================================================================
// Local Descriptor
// ============================================================================

/// File-backed route template used to prefill a delta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalDescriptor {
    /// Image name without tag.
    pub name: Option<String>,
    /// Image tag.
    pub version: Option<String>,
    /// IO format.
    pub format: Option<String>,
    /// Max concurrency.
    pub max_concurrency: Option<u32>,
    /// Timeout in seconds.
    pub timeout: Option<u64>,
    /// Route path.
    pub path: Option<String>,
}

impl LocalDescriptor {
    /// Fully-qualified image name: `name:version`, or `name` when untagged.
    ///
    /// ```
    /// use routekit::LocalDescriptor;
    ///
    /// let ff = LocalDescriptor {
    ///     name: Some("acme/hello".to_string()),
    ///     version: Some("0.0.2".to_string()),
    ///     ..LocalDescriptor::default()
    /// };
    /// assert_eq!(ff.full_name().as_deref(), Some("acme/hello:0.0.2"));
    /// ```
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        let name = self.name.as_deref().filter(|n| !n.is_empty())?;
        match self.version.as_deref().filter(|v| !v.is_empty()) {
            Some(version) => Some(format!("{name}:{version}")),
            None => Some(name.to_string()),
        }
    }
}

// ============================================================================
// Invocation
// ============================================================================

/// A direct call to a route's public endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// HTTP method.
    pub method: String,
    /// Request body, if any.
    pub body: Option<Vec<u8>>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl Invocation {
    /// Build an invocation, defaulting the method to POST with a body and GET
    /// without one.
    #[must_use]
    pub fn new(method: Option<&str>, body: Option<Vec<u8>>) -> Self {
        let method = match method.filter(|m| !m.is_empty()) {
            Some(m) => m.to_uppercase(),
            None if body.is_some() => "POST".to_string(),
            None => "GET".to_string(),
        };
        Self {
            method,
            body,
            headers: Vec::new(),
        }
    }

    /// Add a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

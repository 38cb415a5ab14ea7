//! Field precedence between defaults, the local descriptor, and flags.
//!
//! Priority, lowest first:
//! 1. defaults (create only)
//! 2. [`LocalDescriptor`] value, if present and non-empty
//! 3. explicit flag value, if present
//!
//! Empty sources are skipped silently.

use crate::error::{Error, Result};
use crate::types::{LocalDescriptor, RouteDelta, RouteType};

/// Memory applied on create when neither flag nor descriptor sets it.
pub const DEFAULT_MEMORY: u64 = 128;
/// Max concurrency applied on create.
pub const DEFAULT_MAX_CONCURRENCY: u32 = 1;
/// Timeout in seconds applied on create.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which command the fields are resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// New route: defaults apply and an image is required.
    Create,
    /// Existing route: unresolved fields keep their remote value.
    Update,
}

/// Outcome of resolution: the route path and the delta to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Route path.
    pub path: String,
    /// Fields to create or patch with.
    pub delta: RouteDelta,
}

/// Pick the highest-priority present value.
pub fn pick<T>(flag: Option<T>, descriptor: Option<T>) -> Option<T> {
    flag.or(descriptor)
}

/// Like [`pick`], treating empty strings as absent.
pub fn pick_str(flag: Option<String>, descriptor: Option<String>) -> Option<String> {
    pick(non_empty(flag), non_empty(descriptor))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Resolve the path and every scalar field from flags and the descriptor.
///
/// `path` is the positional argument. `flags` carries the explicit flag
/// values together with the config and header changes, which pass through
/// untouched.
///
/// # Errors
///
/// Returns [`Error::Validation`] with `route path is missing` when no path is
/// available, and on create with `image name is missing` when no image is.
///
/// # Example
///
/// ```
/// use routekit::resolve::{resolve, Mode};
/// use routekit::{LocalDescriptor, RouteDelta};
///
/// let ff = LocalDescriptor {
///     name: Some("acme/hello".to_string()),
///     timeout: Some(30),
///     ..LocalDescriptor::default()
/// };
/// let flags = RouteDelta { timeout: Some(45), ..RouteDelta::default() };
///
/// let resolved = resolve(Mode::Update, Some("/hello"), flags, Some(&ff)).unwrap();
/// assert_eq!(resolved.delta.timeout, Some(45));
/// assert_eq!(resolved.delta.image.as_deref(), Some("acme/hello"));
/// ```
pub fn resolve(
    mode: Mode,
    path: Option<&str>,
    flags: RouteDelta,
    descriptor: Option<&LocalDescriptor>,
) -> Result<Resolved> {
    let ff = descriptor.cloned().unwrap_or_default();

    let path = pick_str(path.map(str::to_string), ff.path.clone())
        .ok_or_else(|| Error::validation("route path is missing"))?;

    let mut delta = RouteDelta {
        image: pick_str(flags.image, ff.full_name()),
        memory: flags.memory,
        route_type: flags.route_type,
        format: pick_str(flags.format, ff.format),
        max_concurrency: pick(flags.max_concurrency, ff.max_concurrency),
        timeout: pick(flags.timeout, ff.timeout),
        config: flags.config,
        headers: flags.headers,
    };

    if mode == Mode::Create {
        if delta.image.is_none() {
            return Err(Error::validation("image name is missing"));
        }
        delta.memory = delta.memory.or(Some(DEFAULT_MEMORY));
        delta.route_type = delta.route_type.or(Some(RouteType::Sync));
        delta.max_concurrency = delta.max_concurrency.or(Some(DEFAULT_MAX_CONCURRENCY));
        delta.timeout = delta.timeout.or(Some(DEFAULT_TIMEOUT_SECS));
    }

    log::debug!("resolved {:?} fields for {}: {:?}", mode, path, delta);
    Ok(Resolved { path, delta })
}

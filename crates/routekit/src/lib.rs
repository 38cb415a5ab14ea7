//! # routekit
//!
//! Pure Rust library for managing routes on a functions server.
//!
//! This crate provides:
//! - The route patch engine: fetch, merge config/header deltas, submit
//! - Field precedence between a local func file and explicit flags
//! - An error taxonomy keyed by status classification
//! - A blocking HTTP backend and an in-memory mock backend
//!
//! ## Example
//!
//! ```no_run
//! use routekit::{Client, RouteDelta};
//!
//! let client = Client::new("http://localhost:8080");
//!
//! // Set one config key and drop another, leaving everything else as is
//! let delta = RouteDelta::new()
//!     .set_config("DB_URL", "postgres://db/prod")
//!     .unset_config("DEBUG");
//!
//! let route = client.patch("myapp", "/hello", Some(&delta)).expect("patch failed");
//! println!("{} now runs {}", route.path, route.image);
//! ```
//!
//! ## Deletions
//!
//! Config and header changes are explicit [`DeltaEntry`] values. A key that
//! starts with `-` is an ordinary key; use [`DeltaEntry::delete`] (or
//! [`DeltaEntry::from_prefixed`] for legacy `-key` literals) to remove one.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod merge;
pub mod patch;
pub mod resolve;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use types::{
    ConfigMap, DeltaEntry, EntryOp, HeaderMap, Invocation, LocalDescriptor, Route, RouteDelta,
    RouteType,
};

use backend::Backend;
pub use backend::MockBackend;
use backend::http::HttpBackend;

/// High-level client for route operations.
///
/// The backend is injected at construction, so tests can swap the HTTP
/// transport for a [`MockBackend`].
///
/// # Example
///
/// ```
/// use routekit::{Client, MockBackend, Route, RouteDelta};
///
/// let mut mock = MockBackend::new();
/// mock.add_route("myapp", Route::new("/hello", "acme/hello:1"));
/// let client = Client::with_backend(Box::new(mock));
///
/// let delta = RouteDelta::new().set_config("a", "1");
/// let route = client.patch("myapp", "/hello", Some(&delta)).unwrap();
/// assert_eq!(route.config.unwrap()["a"], "1");
/// ```
pub struct Client {
    backend: Box<dyn Backend>,
}

impl Client {
    /// Create a client talking HTTP to the server at `api_url`.
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            backend: Box::new(HttpBackend::new(api_url)),
        }
    }

    /// Create a client with a custom backend (useful for testing).
    #[must_use]
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    // =========================================================================
    // Write Operations
    // =========================================================================

    /// Create a route from a fully resolved delta.
    ///
    /// Fails with a validation error before any network call when the path or
    /// the image is missing.
    pub fn create(&self, app: &str, path: &str, delta: &RouteDelta) -> Result<Route> {
        require_path(path)?;
        if delta.image.as_deref().is_none_or(str::is_empty) {
            return Err(Error::validation("image name is missing"));
        }

        let route = patch::build(path, delta);
        log::info!("creating route {app}{path} with {}", route.image);
        self.backend
            .create_route(app, &route)
            .map_err(|e| e.surface_only(&[ErrorCategory::BadRequest, ErrorCategory::Conflict]))
    }

    /// Patch a route: fetch it, merge `delta`, and submit the result.
    ///
    /// Either the full merged route is submitted or nothing is. A `None`
    /// delta re-submits the current route unchanged.
    pub fn patch(&self, app: &str, path: &str, delta: Option<&RouteDelta>) -> Result<Route> {
        require_path(path)?;

        let mut route = self
            .backend
            .fetch_route(app, path)
            .map_err(|e| e.surface_only(&[ErrorCategory::NotFound]))?;
        log::debug!("fetched {app}{path}: {route:?}");

        patch::prepare(&mut route);
        if let Some(delta) = delta {
            patch::apply(&mut route, delta);
        }

        log::info!("submitting merged route {app}{path}");
        self.backend
            .replace_route(app, path, &route)
            .map_err(|e| {
                e.surface_only(&[
                    ErrorCategory::BadRequest,
                    ErrorCategory::NotFound,
                    ErrorCategory::Conflict,
                ])
            })
    }

    /// Delete a route.
    pub fn delete(&self, app: &str, path: &str) -> Result<()> {
        require_path(path)?;
        self.backend
            .delete_route(app, path)
            .map_err(|e| e.surface_only(&[ErrorCategory::NotFound]))
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Fetch a single route.
    pub fn get(&self, app: &str, path: &str) -> Result<Route> {
        require_path(path)?;
        self.backend
            .fetch_route(app, path)
            .map_err(|e| e.surface_only(&[ErrorCategory::NotFound]))
    }

    /// List the routes of an app.
    pub fn list(&self, app: &str) -> Result<Vec<Route>> {
        self.backend
            .list_routes(app)
            .map_err(|e| e.surface_only(&[ErrorCategory::NotFound]))
    }

    /// Call a route's public endpoint and return the response body.
    pub fn call(&self, app: &str, path: &str, invocation: &Invocation) -> Result<Vec<u8>> {
        require_path(path)?;
        self.backend
            .invoke(app, path, invocation)
            .map_err(|e| e.surface_only(&[]))
    }
}

fn require_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::validation("route path is missing"));
    }
    Ok(())
}

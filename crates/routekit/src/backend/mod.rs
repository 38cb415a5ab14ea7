//! Backend trait and implementations for talking to the functions API.
//!
//! This module provides the [`Backend`] trait, the [`http::HttpBackend`]
//! used against a real server, and [`MockBackend`] for tests.
//!
//! # Testing
//!
//! Use [`MockBackend`] to exercise route operations without network access:
//!
//! ```
//! use routekit::backend::{Backend, MockBackend};
//! use routekit::Route;
//!
//! let mut mock = MockBackend::new();
//! mock.add_route("myapp", Route::new("/hello", "acme/hello"));
//!
//! let route = mock.fetch_route("myapp", "/hello").unwrap();
//! assert_eq!(route.image, "acme/hello");
//! ```

pub mod http;

use crate::error::{Error, Result};
use crate::types::{Invocation, Route};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// Request/response contract of the functions API.
///
/// Implementations report failures through [`Error::from_status`] so the
/// client can classify them without knowing the transport.
pub trait Backend: Send + Sync {
    /// Fetch a single route.
    fn fetch_route(&self, app: &str, path: &str) -> Result<Route>;

    /// Replace a route with `route`, returning the stored result.
    fn replace_route(&self, app: &str, path: &str, route: &Route) -> Result<Route>;

    /// Create a route under `app`.
    fn create_route(&self, app: &str, route: &Route) -> Result<Route>;

    /// List all routes of `app`.
    fn list_routes(&self, app: &str) -> Result<Vec<Route>>;

    /// Delete a route.
    fn delete_route(&self, app: &str, path: &str) -> Result<()>;

    /// Call the route's public endpoint and return the response body.
    fn invoke(&self, app: &str, path: &str, invocation: &Invocation) -> Result<Vec<u8>>;
}

/// Backend operations, used to target injected failures and to record calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`Backend::fetch_route`].
    Fetch,
    /// [`Backend::replace_route`].
    Replace,
    /// [`Backend::create_route`].
    Create,
    /// [`Backend::list_routes`].
    List,
    /// [`Backend::delete_route`].
    Delete,
    /// [`Backend::invoke`].
    Invoke,
}

/// A payload received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Which call carried it.
    pub operation: Operation,
    /// Target app.
    pub app: String,
    /// Target path (empty for create, which takes it from the payload).
    pub path: String,
    /// Route exactly as sent.
    pub route: Route,
}

/// Mock backend for testing without network access.
///
/// Routes live in memory keyed by app and path. Clones share state, so a
/// test can keep a handle after boxing one into a [`Client`](crate::Client).
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    apps: Arc<Mutex<BTreeMap<String, BTreeMap<String, Route>>>>,
    failures: Arc<Mutex<HashMap<Operation, (u16, String)>>>,
    calls: Arc<Mutex<Vec<Operation>>>,
    submissions: Arc<Mutex<Vec<Submission>>>,
    responses: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockBackend {
    /// Create a new empty mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an app with no routes.
    pub fn add_app(&mut self, app: impl Into<String>) {
        self.apps.lock().unwrap().entry(app.into()).or_default();
    }

    /// Store a route under `app`, creating the app if needed.
    pub fn add_route(&mut self, app: impl Into<String>, mut route: Route) {
        let app = app.into();
        route.app_name = app.clone();
        self.apps
            .lock()
            .unwrap()
            .entry(app)
            .or_default()
            .insert(route.path.clone(), route);
    }

    /// Make every call of `operation` fail with the given HTTP status.
    pub fn fail(&mut self, operation: Operation, status: u16, message: impl Into<String>) {
        self.failures
            .lock()
            .unwrap()
            .insert(operation, (status, message.into()));
    }

    /// Set the body returned when invoking `path` under `app`.
    pub fn add_response(&mut self, app: &str, path: &str, body: impl Into<Vec<u8>>) {
        self.responses
            .lock()
            .unwrap()
            .insert(format!("{app}{path}"), body.into());
    }

    /// Stored route, if any.
    #[must_use]
    pub fn route(&self, app: &str, path: &str) -> Option<Route> {
        self.apps
            .lock()
            .unwrap()
            .get(app)
            .and_then(|routes| routes.get(path))
            .cloned()
    }

    /// Operations received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Operation> {
        self.calls.lock().unwrap().clone()
    }

    /// Payloads received by create and replace, in order.
    #[must_use]
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    fn enter(&self, operation: Operation) -> Result<()> {
        self.calls.lock().unwrap().push(operation);
        match self.failures.lock().unwrap().get(&operation) {
            Some((status, message)) => Err(Error::from_status(*status, message.clone())),
            None => Ok(()),
        }
    }

    fn record(&self, operation: Operation, app: &str, path: &str, route: &Route) {
        self.submissions.lock().unwrap().push(Submission {
            operation,
            app: app.to_string(),
            path: path.to_string(),
            route: route.clone(),
        });
    }
}

fn app_not_found() -> Error {
    Error::from_status(404, "App not found")
}

fn route_not_found() -> Error {
    Error::from_status(404, "Route not found")
}

impl Backend for MockBackend {
    fn fetch_route(&self, app: &str, path: &str) -> Result<Route> {
        self.enter(Operation::Fetch)?;
        let apps = self.apps.lock().unwrap();
        let routes = apps.get(app).ok_or_else(app_not_found)?;
        routes.get(path).cloned().ok_or_else(route_not_found)
    }

    fn replace_route(&self, app: &str, path: &str, route: &Route) -> Result<Route> {
        self.enter(Operation::Replace)?;
        self.record(Operation::Replace, app, path, route);
        if !route.path.is_empty() && route.path != path {
            return Err(Error::from_status(400, "Could not update route - path is immutable"));
        }

        let mut apps = self.apps.lock().unwrap();
        let routes = apps.get_mut(app).ok_or_else(app_not_found)?;
        let stored = routes.get_mut(path).ok_or_else(route_not_found)?;
        *stored = Route {
            app_name: app.to_string(),
            path: path.to_string(),
            ..route.clone()
        };
        Ok(stored.clone())
    }

    fn create_route(&self, app: &str, route: &Route) -> Result<Route> {
        self.enter(Operation::Create)?;
        self.record(Operation::Create, app, "", route);
        if route.path.is_empty() {
            return Err(Error::from_status(400, "Missing route path"));
        }

        let mut apps = self.apps.lock().unwrap();
        let routes = apps.entry(app.to_string()).or_default();
        if routes.contains_key(&route.path) {
            return Err(Error::from_status(409, "Route already exists"));
        }
        let stored = Route {
            app_name: app.to_string(),
            ..route.clone()
        };
        routes.insert(stored.path.clone(), stored.clone());
        Ok(stored)
    }

    fn list_routes(&self, app: &str) -> Result<Vec<Route>> {
        self.enter(Operation::List)?;
        let apps = self.apps.lock().unwrap();
        let routes = apps.get(app).ok_or_else(app_not_found)?;
        Ok(routes.values().cloned().collect())
    }

    fn delete_route(&self, app: &str, path: &str) -> Result<()> {
        self.enter(Operation::Delete)?;
        let mut apps = self.apps.lock().unwrap();
        let routes = apps.get_mut(app).ok_or_else(app_not_found)?;
        routes.remove(path).map(|_| ()).ok_or_else(route_not_found)
    }

    fn invoke(&self, app: &str, path: &str, _invocation: &Invocation) -> Result<Vec<u8>> {
        self.enter(Operation::Invoke)?;
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(&format!("{app}{path}"))
            .cloned()
            .unwrap_or_default())
    }
}

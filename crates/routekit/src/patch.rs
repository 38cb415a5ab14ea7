//! Applying a [`RouteDelta`] to a fetched [`Route`].
//!
//! [`Client::patch`](crate::Client::patch) fetches the route, calls
//! [`prepare`] and [`apply`] here, then submits the result. Nothing in this
//! module touches the network.

use crate::merge::merge;
use crate::types::{Route, RouteDelta};

/// Normalize a fetched route for re-submission.
///
/// Absent config and header maps become empty maps, and the path is cleared
/// because route identity is path-keyed and must not travel in the payload.
pub fn prepare(route: &mut Route) {
    route.config.get_or_insert_with(Default::default);
    route.headers.get_or_insert_with(Default::default);
    route.path.clear();
}

/// Merge `delta` into `route`.
///
/// Config and headers go through [`merge`]; each scalar is overwritten only
/// when the delta carries a value for it.
pub fn apply(route: &mut Route, delta: &RouteDelta) {
    merge(route.config.get_or_insert_with(Default::default), &delta.config);
    merge(
        route.headers.get_or_insert_with(Default::default),
        &delta.headers,
    );

    if let Some(image) = delta.image.as_ref().filter(|i| !i.is_empty()) {
        route.image = image.clone();
    }
    if let Some(format) = delta.format.as_ref().filter(|f| !f.is_empty()) {
        route.format = format.clone();
    }
    if let Some(route_type) = delta.route_type {
        route.route_type = Some(route_type);
    }
    // Zero memory or concurrency is never serialized, so it counts as unset.
    if let Some(max_concurrency) = delta.max_concurrency.filter(|mc| *mc > 0) {
        route.max_concurrency = max_concurrency;
    }
    if let Some(memory) = delta.memory.filter(|m| *m > 0) {
        route.memory = memory;
    }
    if let Some(timeout) = delta.timeout {
        route.timeout = Some(timeout);
    }
}

/// Build a new route from a create delta.
pub fn build(path: &str, delta: &RouteDelta) -> Route {
    let mut route = Route {
        path: path.to_string(),
        ..Route::default()
    };
    apply(&mut route, delta);
    if route.config.as_ref().is_some_and(|c| c.is_empty()) {
        route.config = None;
    }
    if route.headers.as_ref().is_some_and(|h| h.is_empty()) {
        route.headers = None;
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RouteType;
    use std::collections::BTreeMap;

    fn fetched() -> Route {
        Route {
            app_name: "myapp".to_string(),
            path: "/hello".to_string(),
            image: "acme/hello:1".to_string(),
            memory: 128,
            route_type: Some(RouteType::Sync),
            format: "json".to_string(),
            max_concurrency: 2,
            timeout: Some(30),
            config: None,
            headers: None,
        }
    }

    #[test]
    fn test_prepare_initializes_maps_and_clears_path() {
        let mut route = fetched();
        prepare(&mut route);
        assert_eq!(route.path, "");
        assert_eq!(route.config, Some(BTreeMap::new()));
        assert_eq!(route.headers, Some(BTreeMap::new()));
    }

    #[test]
    fn test_prepared_payload_has_no_path() {
        let mut route = fetched();
        prepare(&mut route);
        let json = serde_json::to_value(&route).unwrap();
        assert!(json.get("path").is_none());
    }

    #[test]
    fn test_empty_delta_changes_nothing() {
        let mut route = fetched();
        prepare(&mut route);
        let before = route.clone();
        apply(&mut route, &RouteDelta::new());
        assert_eq!(route, before);
    }

    #[test]
    fn test_apply_scalars() {
        let mut route = fetched();
        prepare(&mut route);
        let delta = RouteDelta {
            image: Some("acme/hello:2".to_string()),
            memory: Some(256),
            route_type: Some(RouteType::Async),
            format: Some("http".to_string()),
            max_concurrency: Some(10),
            timeout: Some(0),
            ..RouteDelta::default()
        };
        apply(&mut route, &delta);
        assert_eq!(route.image, "acme/hello:2");
        assert_eq!(route.memory, 256);
        assert_eq!(route.route_type, Some(RouteType::Async));
        assert_eq!(route.format, "http");
        assert_eq!(route.max_concurrency, 10);
        assert_eq!(route.timeout, Some(0));
    }

    #[test]
    fn test_apply_empty_image_keeps_remote() {
        let mut route = fetched();
        let delta = RouteDelta {
            image: Some(String::new()),
            ..RouteDelta::default()
        };
        apply(&mut route, &delta);
        assert_eq!(route.image, "acme/hello:1");
    }

    #[test]
    fn test_apply_zero_memory_keeps_remote() {
        let mut route = Route {
            memory: 256,
            max_concurrency: 4,
            ..Route::new("/p", "img")
        };
        prepare(&mut route);
        apply(
            &mut route,
            &RouteDelta {
                memory: Some(0),
                max_concurrency: Some(0),
                ..RouteDelta::default()
            },
        );

        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["memory"], 256);
        assert_eq!(json["max_concurrency"], 4);
    }

    #[test]
    fn test_apply_config_and_headers() {
        let mut route = fetched();
        route.config = Some(BTreeMap::from([("b".to_string(), "2".to_string())]));
        prepare(&mut route);
        let delta = RouteDelta::new()
            .set_config("a", "1")
            .set_header("X-Id", vec!["abc".to_string()]);
        apply(&mut route, &delta);
        let config = route.config.unwrap();
        assert_eq!(config.len(), 2);
        assert_eq!(config["a"], "1");
        assert_eq!(config["b"], "2");
        assert_eq!(route.headers.unwrap()["X-Id"], vec!["abc"]);
    }

    #[test]
    fn test_build_from_create_delta() {
        let delta = RouteDelta {
            image: Some("acme/hello".to_string()),
            memory: Some(128),
            route_type: Some(RouteType::Sync),
            max_concurrency: Some(1),
            timeout: Some(0),
            ..RouteDelta::default()
        }
        .set_config("DB", "pg");

        let route = build("/hello", &delta);
        assert_eq!(route.path, "/hello");
        assert_eq!(route.image, "acme/hello");
        assert_eq!(route.timeout, Some(0));
        assert_eq!(route.config.unwrap()["DB"], "pg");
        assert!(route.headers.is_none());
    }
}

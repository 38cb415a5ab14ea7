//! Route management commands.
//!
//! Handlers here turn parsed flags into a [`RouteDelta`], layer the local func
//! file underneath with [`resolve`], and hand the result to the client.

use crate::Context;
use crate::cli::{RouteConfigCommand, RouteFieldArgs, RoutesCommand};
use crate::commands::call;
use crate::funcfile;
use crate::ui;
use anyhow::{Context as _, Result};
use routekit::merge::{parse_config_literal, parse_header_literal};
use routekit::resolve::{Mode, resolve};
use routekit::{Client, DeltaEntry, LocalDescriptor, RouteDelta};
use serde_json::Value;

/// Run a routes subcommand.
pub fn run(ctx: &Context, client: &Client, cmd: RoutesCommand) -> Result<()> {
    match cmd {
        RoutesCommand::Call(args) => call::run(client, args),
        RoutesCommand::List { app } => list(ctx, client, &app),
        RoutesCommand::Create {
            app,
            path,
            image,
            fields,
        } => {
            let flags = field_delta(fields, image)?;
            create(ctx, client, &app, path.as_deref(), flags, load_descriptor()?)
        }
        RoutesCommand::Update {
            app,
            path,
            image,
            image_flag,
            fields,
            unset_config,
            unset_header,
        } => {
            let mut flags = field_delta(fields, image.or(image_flag))?;
            flags
                .config
                .extend(unset_config.into_iter().map(DeltaEntry::delete));
            flags
                .headers
                .extend(unset_header.into_iter().map(DeltaEntry::delete));
            update(ctx, client, &app, path.as_deref(), flags, load_descriptor()?)
        }
        RoutesCommand::Config(RouteConfigCommand::Set {
            app,
            path,
            key,
            value,
        }) => config_set(ctx, client, &app, &path, &key, &value),
        RoutesCommand::Config(RouteConfigCommand::Unset { app, path, key }) => {
            config_unset(ctx, client, &app, &path, &key)
        }
        RoutesCommand::Delete { app, path } => delete(ctx, client, &app, &path),
        RoutesCommand::Inspect {
            app,
            path,
            property,
        } => inspect(client, &app, &path, property.as_deref()),
    }
}

// =============================================================================
// Flag Handling
// =============================================================================

/// Turn explicit flags into a delta. Unset flags stay `None`.
fn field_delta(fields: RouteFieldArgs, image: Option<String>) -> Result<RouteDelta> {
    let config = fields
        .config
        .iter()
        .map(|literal| parse_config_literal(literal))
        .collect::<routekit::Result<Vec<_>>>()?;
    let headers = fields
        .headers
        .iter()
        .map(|literal| parse_header_literal(literal))
        .collect::<routekit::Result<Vec<_>>>()?;

    Ok(RouteDelta {
        image,
        memory: fields.memory,
        route_type: fields.route_type.map(Into::into),
        format: fields.format,
        max_concurrency: fields.max_concurrency,
        timeout: fields.timeout.map(|d| d.as_secs()),
        config,
        headers,
    })
}

fn load_descriptor() -> Result<Option<LocalDescriptor>> {
    let dir = std::env::current_dir().context("Could not determine current directory")?;
    funcfile::load(&dir)
}

// =============================================================================
// Write Commands
// =============================================================================

fn create(
    ctx: &Context,
    client: &Client,
    app: &str,
    path: Option<&str>,
    flags: RouteDelta,
    descriptor: Option<LocalDescriptor>,
) -> Result<()> {
    let resolved = resolve(Mode::Create, path, flags, descriptor.as_ref())?;
    let route = client.create(app, &resolved.path, &resolved.delta)?;

    if !ctx.quiet {
        ui::success(&format!("{} created with {}", route.path, route.image));
    }
    Ok(())
}

fn update(
    ctx: &Context,
    client: &Client,
    app: &str,
    path: Option<&str>,
    flags: RouteDelta,
    descriptor: Option<LocalDescriptor>,
) -> Result<()> {
    if descriptor.is_none() && !ctx.quiet {
        ui::warn("func file not found, continuing...");
    }

    let resolved = resolve(Mode::Update, path, flags, descriptor.as_ref())?;
    client.patch(app, &resolved.path, Some(&resolved.delta))?;

    if !ctx.quiet {
        ui::success(&format!("{} {} updated", app, resolved.path));
    }
    Ok(())
}

fn config_set(
    ctx: &Context,
    client: &Client,
    app: &str,
    path: &str,
    key: &str,
    value: &str,
) -> Result<()> {
    let delta = RouteDelta::new().set_config(key, value);
    client.patch(app, path, Some(&delta))?;

    if !ctx.quiet {
        ui::success(&format!("{} {} updated {} with {}", app, path, key, value));
    }
    Ok(())
}

fn config_unset(ctx: &Context, client: &Client, app: &str, path: &str, key: &str) -> Result<()> {
    let delta = RouteDelta::new().unset_config(key);
    client.patch(app, path, Some(&delta))?;

    if !ctx.quiet {
        ui::success(&format!(
            "removed key '{}' from the route '{}{}'",
            key, app, path
        ));
    }
    Ok(())
}

fn delete(ctx: &Context, client: &Client, app: &str, path: &str) -> Result<()> {
    client.delete(app, path)?;

    if !ctx.quiet {
        ui::success(&format!("{} {} deleted", app, path));
    }
    Ok(())
}

// =============================================================================
// Read Commands
// =============================================================================

fn list(ctx: &Context, client: &Client, app: &str) -> Result<()> {
    let routes = client.list(app)?;

    if routes.is_empty() {
        if !ctx.quiet {
            ui::info(&format!("No routes found for app '{}'", app));
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = routes
        .iter()
        .map(|route| {
            vec![
                route.path.clone(),
                route.image.clone(),
                endpoint(&ctx.api_url, app, &route.path),
            ]
        })
        .collect();

    ui::table(&["path", "image", "endpoint"], &rows);
    Ok(())
}

fn inspect(client: &Client, app: &str, path: &str, property: Option<&str>) -> Result<()> {
    let route = client.get(app, path)?;
    let value = serde_json::to_value(&route).context("failed to inspect route")?;

    let selected = match property {
        Some(property) => {
            select(&value, property).context("failed to inspect that route's field")?
        }
        None => &value,
    };

    println!("{}", serde_json::to_string_pretty(selected)?);
    Ok(())
}

/// Public call endpoint of a route.
fn endpoint(api_url: &str, app: &str, path: &str) -> String {
    format!("{}/r/{}{}", api_url.trim_end_matches('/'), app, path)
}

/// Walk a dotted property path (`config.KEY`, `headers.NAME.0`).
fn select<'a>(value: &'a Value, property: &str) -> Option<&'a Value> {
    property
        .split('.')
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use routekit::backend::Operation;
    use routekit::{MockBackend, Route, RouteType};
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn ctx() -> Context {
        Context {
            quiet: true,
            api_url: "http://localhost:8080".to_string(),
        }
    }

    fn fields() -> RouteFieldArgs {
        RouteFieldArgs {
            memory: None,
            route_type: None,
            config: Vec::new(),
            headers: Vec::new(),
            format: None,
            max_concurrency: None,
            timeout: None,
        }
    }

    fn mock() -> MockBackend {
        let mut mock = MockBackend::new();
        mock.add_route(
            "myapp",
            Route {
                config: Some(BTreeMap::from([("b".to_string(), "2".to_string())])),
                ..Route::new("/hello", "acme/hello:1")
            },
        );
        mock
    }

    #[test]
    fn test_field_delta_maps_flags() {
        let mut f = fields();
        f.memory = Some(256);
        f.route_type = Some(crate::cli::RouteTypeArg::Async);
        f.timeout = Some(Duration::from_secs(45));
        f.config = vec!["A=1".to_string()];
        f.headers = vec!["X-Id=a;b".to_string()];

        let delta = field_delta(f, Some("acme/hello:2".to_string())).unwrap();
        assert_eq!(delta.image.as_deref(), Some("acme/hello:2"));
        assert_eq!(delta.memory, Some(256));
        assert_eq!(delta.route_type, Some(RouteType::Async));
        assert_eq!(delta.timeout, Some(45));
        assert_eq!(delta.config, vec![DeltaEntry::set("A", "1".to_string())]);
        assert_eq!(
            delta.headers,
            vec![DeltaEntry::set("X-Id", vec!["a".to_string(), "b".to_string()])]
        );
    }

    #[test]
    fn test_field_delta_rejects_bad_literal() {
        let mut f = fields();
        f.config = vec!["NOVALUE".to_string()];
        assert!(field_delta(f, None).is_err());
    }

    #[test]
    fn test_field_delta_empty_is_empty() {
        assert!(field_delta(fields(), None).unwrap().is_empty());
    }

    #[test]
    fn test_create_uses_descriptor() {
        let mock = MockBackend::new();
        let client = Client::with_backend(Box::new(mock.clone()));
        let descriptor = LocalDescriptor {
            name: Some("acme/hello".to_string()),
            version: Some("0.0.1".to_string()),
            path: Some("/hello".to_string()),
            ..LocalDescriptor::default()
        };

        create(&ctx(), &client, "myapp", None, RouteDelta::new(), Some(descriptor)).unwrap();

        let stored = mock.route("myapp", "/hello").unwrap();
        assert_eq!(stored.image, "acme/hello:0.0.1");
        assert_eq!(stored.timeout, Some(30));
    }

    #[test]
    fn test_create_without_path_makes_no_calls() {
        let mock = MockBackend::new();
        let client = Client::with_backend(Box::new(mock.clone()));

        let err = create(&ctx(), &client, "myapp", None, RouteDelta::new(), None).unwrap_err();
        assert_eq!(err.to_string(), "route path is missing");
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_update_without_image_or_descriptor() {
        let mock = mock();
        let client = Client::with_backend(Box::new(mock.clone()));
        let flags = RouteDelta {
            format: Some("http".to_string()),
            ..RouteDelta::default()
        };

        update(&ctx(), &client, "myapp", Some("/hello"), flags, None).unwrap();

        let stored = mock.route("myapp", "/hello").unwrap();
        assert_eq!(stored.image, "acme/hello:1");
        assert_eq!(stored.format, "http");
    }

    #[test]
    fn test_config_set_and_unset() {
        let mock = mock();
        let client = Client::with_backend(Box::new(mock.clone()));

        config_set(&ctx(), &client, "myapp", "/hello", "a", "1").unwrap();
        let config = mock.route("myapp", "/hello").unwrap().config.unwrap();
        assert_eq!(config.len(), 2);

        config_unset(&ctx(), &client, "myapp", "/hello", "b").unwrap();
        let config = mock.route("myapp", "/hello").unwrap().config.unwrap();
        assert_eq!(config.len(), 1);
        assert_eq!(config["a"], "1");

        assert_eq!(
            mock.calls(),
            vec![
                Operation::Fetch,
                Operation::Replace,
                Operation::Fetch,
                Operation::Replace
            ]
        );
    }

    #[test]
    fn test_delete_missing_route() {
        let mock = mock();
        let client = Client::with_backend(Box::new(mock));

        let err = delete(&ctx(), &client, "myapp", "/nope").unwrap_err();
        assert_eq!(err.to_string(), "Route not found");
    }

    #[test]
    fn test_inspect_unknown_property() {
        let client = Client::with_backend(Box::new(mock()));
        let err = inspect(&client, "myapp", "/hello", Some("nope")).unwrap_err();
        assert_eq!(err.to_string(), "failed to inspect that route's field");
    }

    #[test]
    fn test_select_nested() {
        let value = serde_json::json!({
            "image": "acme/hello",
            "config": {"DB": "pg"},
            "headers": {"X-Id": ["a", "b"]}
        });
        assert_eq!(select(&value, "image"), Some(&Value::from("acme/hello")));
        assert_eq!(select(&value, "config.DB"), Some(&Value::from("pg")));
        assert_eq!(select(&value, "headers.X-Id.1"), Some(&Value::from("b")));
        assert_eq!(select(&value, "config.MISSING"), None);
        assert_eq!(select(&value, "image.deeper"), None);
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            endpoint("http://localhost:8080/", "myapp", "/hello"),
            "http://localhost:8080/r/myapp/hello"
        );
    }
}

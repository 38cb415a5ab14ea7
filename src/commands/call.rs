//! Direct route invocation.

use crate::cli::CallArgs;
use anyhow::{Context as _, Result};
use routekit::{Client, Invocation};
use std::io::{self, IsTerminal, Read, Write};

/// Call a route, forwarding piped stdin as the request body.
pub fn run(client: &Client, args: CallArgs) -> Result<()> {
    let body = read_stdin()?;
    let output = invoke(client, &args, body)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&output)?;
    stdout.flush()?;
    Ok(())
}

fn invoke(client: &Client, args: &CallArgs, body: Option<Vec<u8>>) -> Result<Vec<u8>> {
    let invocation = args
        .env
        .iter()
        .map(|literal| env_name(literal))
        .fold(Invocation::new(args.method.as_deref(), body), |inv, name| {
            let value = std::env::var(name).unwrap_or_default();
            inv.header(name, value)
        });

    log::debug!(
        "{} {}{} with {} header(s)",
        invocation.method,
        args.app,
        args.path,
        invocation.headers.len()
    );
    Ok(client.call(&args.app, &args.path, &invocation)?)
}

/// `NAME=...` forwards `NAME`; the local value is always what gets sent.
fn env_name(literal: &str) -> &str {
    literal.split_once('=').map_or(literal, |(name, _)| name)
}

fn read_stdin() -> Result<Option<Vec<u8>>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buf = Vec::new();
    stdin
        .lock()
        .read_to_end(&mut buf)
        .context("Could not read request body from stdin")?;
    Ok(Some(buf))
}

//! Config and header map merging.
//!
//! The same merge applies to the `config` map (`String -> String`) and the
//! `headers` map (`String -> Vec<String>`). Flag literals are parsed into
//! [`DeltaEntry`] lists here so callers never deal with raw key syntax.

use crate::error::{Error, Result};
use crate::types::{DeltaEntry, EntryOp};
use std::collections::BTreeMap;

/// Apply `delta` to `current` in place.
///
/// `Set` inserts or overwrites, `Delete` removes the key if present.
/// Deleting an absent key is a no-op.
///
/// # Example
///
/// ```
/// use routekit::merge::merge;
/// use routekit::DeltaEntry;
/// use std::collections::BTreeMap;
///
/// let mut config = BTreeMap::from([("b".to_string(), "2".to_string())]);
/// merge(&mut config, &[DeltaEntry::set("a", "1".to_string())]);
/// assert_eq!(config.len(), 2);
/// ```
pub fn merge<V: Clone>(current: &mut BTreeMap<String, V>, delta: &[DeltaEntry<V>]) {
    for entry in delta {
        match &entry.op {
            EntryOp::Set(value) => {
                current.insert(entry.key.clone(), value.clone());
            }
            EntryOp::Delete => {
                current.remove(&entry.key);
            }
        }
    }
}

/// Parse a `KEY=VALUE` config literal. The value may itself contain `=`.
pub fn parse_config_literal(literal: &str) -> Result<DeltaEntry<String>> {
    let (key, value) = split_literal(literal, "config")?;
    Ok(DeltaEntry::set(key, value.to_string()))
}

/// Parse a `name=v1;v2;...` header literal into an ordered value list.
pub fn parse_header_literal(literal: &str) -> Result<DeltaEntry<Vec<String>>> {
    let (name, values) = split_literal(literal, "header")?;
    let values = values.split(';').map(str::to_string).collect();
    Ok(DeltaEntry::set(name, values))
}

fn split_literal<'a>(literal: &'a str, what: &str) -> Result<(&'a str, &'a str)> {
    match literal.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(Error::validation(format!(
            "invalid {what} '{literal}': expected NAME=VALUE"
        ))),
    }
}

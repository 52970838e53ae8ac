//! Resource lifecycle commands

use anyhow::{bail, Context, Result};
use serde_json::Value;
use uuid::Uuid;

use super::output::Output;
use crate::domain::{Family, FieldMap, Resource};
use crate::plugin::Registry;
use crate::storage::Library;

fn parse_object(raw: &str) -> Result<FieldMap> {
    let value: Value = serde_json::from_str(raw).context("Data must be valid JSON")?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("Data must be a JSON object"),
    }
}

pub fn add(
    library: &Library,
    registry: &Registry,
    output: &Output,
    family: Family,
    format: &str,
    json: Option<&str>,
) -> Result<()> {
    let input = match json {
        Some(raw) => Resource::new(format)
            .merged(&parse_object(raw)?)
            .context("Invalid resource data")?,
        None => Resource::new(format),
    };

    let uuid = library.store(family)?.add(registry, input)?;

    if output.is_json() {
        output.data(&serde_json::json!({ "uuid": uuid }));
    } else {
        output.success(&uuid.to_string());
    }
    Ok(())
}

pub fn remove(
    library: &Library,
    registry: &Registry,
    output: &Output,
    family: Family,
    uuid: Uuid,
) -> Result<()> {
    library.store(family)?.remove(registry, uuid)?;

    output.success(&format!("Removed {} '{}'", family, uuid));
    Ok(())
}

pub fn modify(
    library: &Library,
    output: &Output,
    family: Family,
    uuid: Uuid,
    data: &str,
) -> Result<()> {
    let entry = library.store(family)?.modify(uuid, &parse_object(data)?)?;

    output.data(&entry);
    Ok(())
}

pub fn modify_extra(
    library: &Library,
    output: &Output,
    family: Family,
    uuid: Uuid,
    field: &str,
    data: &str,
) -> Result<()> {
    let entry = library
        .store(family)?
        .modify_extra(uuid, field, &parse_object(data)?)?;

    output.data(&entry);
    Ok(())
}

pub fn list(library: &Library, output: &Output, family: Family) -> Result<()> {
    let entries = library.store(family)?.list()?;

    if output.is_json() {
        output.data(&entries);
    } else {
        for entry in &entries {
            output.row(&[&entry.uuid.to_string(), &entry.resource.format]);
        }
    }
    Ok(())
}

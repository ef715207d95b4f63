//! Locate addressable lambda effects in an ESPHome configuration document.
//!
//! The document is a generic YAML tree. Entries live under the top-level
//! `display` and `light` sequences; each may carry an `effects` sequence of
//! single-key mappings. Only `addressable_lambda` effects are recognized,
//! everything else is skipped.

pub mod descriptor;
pub mod error;
pub mod interval;

pub use descriptor::{sanitize_name, EffectDescriptor, RenderConfig, DEFAULT_NUM_LEDS};
pub use error::{LocateError, Result};
pub use interval::{parse_interval, resolve_interval};

use serde_yaml::Value;

/// Top-level keys whose sequences hold light-like entries.
pub const ENTRY_KEYS: &[&str] = &["display", "light"];

/// The effect kind this tool knows how to build.
pub const ADDRESSABLE_LAMBDA: &str = "addressable_lambda";

/// Settings shared by every effect found in one document.
#[derive(Debug, Clone, Default)]
pub struct LocateOptions {
    /// File name of the document, used when an entry has no `name`.
    pub source_name: String,
    /// Lower bound applied to every effect's update interval.
    pub min_interval_ms: u32,
    pub render: RenderConfig,
}

/// One recognized effect, named even when its definition is invalid.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedEffect {
    pub component_name: String,
    pub effect_name: String,
    pub descriptor: Result<EffectDescriptor>,
}

/// All entries of the document that may declare effects, `display` first.
pub fn entries(document: &Value) -> Vec<&Value> {
    let document = untag(document);
    ENTRY_KEYS
        .iter()
        .filter_map(|key| document.get(*key))
        .filter_map(|section| untag(section).as_sequence())
        .flatten()
        .collect()
}

/// Extract every addressable lambda effect declared by one entry.
///
/// An entry without `effects`, or whose effects are of another kind, yields
/// nothing.
pub fn locate_effects(entry: &Value, options: &LocateOptions) -> Vec<LocatedEffect> {
    let entry = untag(entry);
    let Some(effects) = entry.get("effects").map(untag).and_then(Value::as_sequence) else {
        tracing::debug!("entry has no effects");
        return Vec::new();
    };

    let mut located = Vec::new();
    for effect_entry in effects {
        let Some(mapping) = untag(effect_entry).as_mapping() else {
            continue;
        };
        for (kind, data) in mapping {
            if scalar(kind).as_deref() != Some(ADDRESSABLE_LAMBDA) {
                tracing::debug!("skipping effect of kind {:?}", scalar(kind));
                continue;
            }
            located.push(locate_effect(entry, untag(data), options));
        }
    }
    located
}

/// Locate effects across the whole document, flattened in entry order.
pub fn locate_document(document: &Value, options: &LocateOptions) -> Vec<LocatedEffect> {
    entries(document)
        .into_iter()
        .flat_map(|entry| locate_effects(entry, options))
        .collect()
}

fn locate_effect(entry: &Value, data: &Value, options: &LocateOptions) -> LocatedEffect {
    let component_name =
        non_empty(entry, "name").unwrap_or_else(|| file_stem(&options.source_name).to_string());
    let effect_name = non_empty(data, "name").unwrap_or_else(|| component_name.clone());
    let descriptor = describe(&component_name, &effect_name, entry, data, options);
    LocatedEffect {
        component_name,
        effect_name,
        descriptor,
    }
}

fn describe(
    component_name: &str,
    effect_name: &str,
    entry: &Value,
    data: &Value,
    options: &LocateOptions,
) -> Result<EffectDescriptor> {
    let code = data
        .get("lambda")
        .and_then(scalar)
        .ok_or_else(|| LocateError::MissingField {
            effect: effect_name.to_string(),
            field: "lambda",
        })?;

    let num_lights = match data.get("num_leds").or_else(|| entry.get("num_leds")) {
        Some(value) => positive_integer("num_leds", value)?,
        None => DEFAULT_NUM_LEDS,
    };

    let literal = data
        .get("update_interval")
        .and_then(scalar)
        .unwrap_or_else(|| interval::DEFAULT_UPDATE_INTERVAL.to_string());
    let update_interval_ms = resolve_interval(&literal, options.min_interval_ms)?;

    Ok(EffectDescriptor {
        component_name: component_name.to_string(),
        effect_name: effect_name.to_string(),
        num_lights,
        update_interval_ms,
        code,
        render: options.render,
    })
}

fn positive_integer(field: &'static str, value: &Value) -> Result<u32> {
    let text = scalar(value).unwrap_or_default();
    match text.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(LocateError::InvalidInteger { field, value: text }),
    }
}

/// A field rendered as a string, treating `""` as absent.
fn non_empty(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(scalar).filter(|s| !s.is_empty())
}

/// Render a scalar as text. Documents are read without tag resolution, so a
/// number and its quoted form are equivalent.
fn scalar(value: &Value) -> Option<String> {
    match untag(value) {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Look through custom tags such as `!lambda` or `!secret`.
fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

/// Base name of `path` with up to two trailing extensions removed.
fn file_stem(path: &str) -> &str {
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    base.rsplitn(3, '.').last().unwrap_or(base)
}

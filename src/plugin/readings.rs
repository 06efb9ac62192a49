//! Configuration readings and descriptions for pipeline nodes

use crate::plugin::error::PluginResult;
use crate::plugin::types::{ConfigAttr, Configuration};
use crate::point::api::{PointProvider, PointValue};
use serde_json::{json, Value};

/// Seconds since the epoch, as carried in reading timestamps
pub(crate) fn timestamp() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1e6
}

pub(crate) fn reading(value: Value) -> Value {
    json!({ "value": value, "timestamp": timestamp() })
}

fn description(source: String, value: &PointValue) -> Value {
    json!({ "source": source, "dtype": value.dtype(), "shape": value.shape() })
}

fn field_name(device: &str, attr: &str) -> String {
    format!("{device}_{attr}")
}

/// Read every attribute from `{prefix}{suffix}` into `{device}_{attr}` fields
pub(crate) async fn read_attrs(
    provider: &dyn PointProvider,
    device: &str,
    prefix: &str,
    attrs: &[ConfigAttr],
) -> PluginResult<Configuration> {
    let mut config = Configuration::new();
    for attr in attrs {
        let value = provider.point(&format!("{prefix}{}", attr.suffix)).get().await?;
        config.insert(field_name(device, attr.attr), reading(value.to_json()));
    }
    Ok(config)
}

pub(crate) async fn describe_attrs(
    provider: &dyn PointProvider,
    device: &str,
    prefix: &str,
    attrs: &[ConfigAttr],
) -> PluginResult<Configuration> {
    let mut config = Configuration::new();
    for attr in attrs {
        let point = format!("{prefix}{}", attr.suffix);
        let value = provider.point(&point).get().await?;
        config.insert(
            field_name(device, attr.attr),
            description(format!("PV:{point}"), &value),
        );
    }
    Ok(config)
}

/// Name of the field listing a node's configuration fields
pub(crate) fn configuration_names_field(device: &str) -> String {
    field_name(device, "configuration_names")
}

/// Field names the given attributes produce, plus the names field itself
pub(crate) fn configuration_names(device: &str, attrs: &[ConfigAttr]) -> Vec<String> {
    attrs
        .iter()
        .map(|attr| field_name(device, attr.attr))
        .chain(std::iter::once(configuration_names_field(device)))
        .collect()
}

/// Reading of a derived list-valued field
pub(crate) fn list_reading(values: &[String]) -> Value {
    reading(json!(values))
}

pub(crate) fn list_description(field: &str, values: &[String]) -> Value {
    json!({ "source": format!("SIM:{field}"), "dtype": "array", "shape": [values.len()] })
}

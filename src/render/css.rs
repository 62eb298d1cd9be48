use anyhow::{bail, Result};

use crate::interpreter::value::Value;

/// Render `{selector → {property → value}}` as CSS blocks, selectors and
/// properties in sorted order.
pub fn to_css(value: &Value) -> Result<String> {
    let Value::Object(rules) = value else {
        bail!("value cannot be converted to css: {value:?}");
    };
    let mut out = String::new();
    for (selector, properties) in rules {
        let Value::Object(properties) = properties else {
            bail!("value cannot be converted to css: {properties:?}");
        };
        let body = properties
            .iter()
            .map(|(property, value)| format!("    {property}: {};", value.display_string()))
            .collect::<Vec<_>>()
            .join("\n");
        out.push_str(&format!("{selector} {{\n{body}\n}}\n"));
    }
    Ok(out)
}

use anyhow::{bail, Result};

use crate::builtins::{is_renderable, is_vnode};
use crate::interpreter::value::Value;
use crate::render::escape;

const SELF_CLOSING: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Tags whose children render without inner indentation.
const PRE_FORMATTED: [&str; 3] = ["pre", "code", "textarea"];

const INDENT: &str = "    ";

/// Render a renderable value — `null`, numbers, strings, sequences,
/// virtual-DOM nodes, trusted HTML — to indented HTML. Attribute keys
/// come out sorted; `className` is emitted as `class` and dropped when
/// empty; `false`/`null` attributes are omitted and `true` attributes
/// emit the bare key.
pub fn to_html(value: &Value) -> Result<String> {
    render(value, 0)
}

fn render(value: &Value, indent: usize) -> Result<String> {
    if !is_renderable(value) {
        bail!("value cannot be converted to html: {value:?}");
    }
    let indent_string = INDENT.repeat(indent);
    match value {
        Value::Null => return Ok(String::new()),
        Value::TrustedHtml(html) => return Ok(format!("{indent_string}{html}")),
        Value::Str(s) => return Ok(format!("{indent_string}{}", escape(s))),
        Value::Int(_) | Value::Float(_) => {
            return Ok(format!("{indent_string}{}", value.display_string()));
        }
        Value::Array(_) => bail!("value cannot be converted to html: {value:?}"),
        _ => {}
    }

    // a virtual-DOM node
    if !is_vnode(value) {
        bail!("value must have tag, attrs, children attributes");
    }
    let Value::Object(vnode) = value else {
        unreachable!("vnodes are mappings");
    };
    let Some(Value::Str(tag)) = vnode.get("tag") else {
        bail!("tag must be a string");
    };
    let Some(Value::Object(attrs)) = vnode.get("attrs") else {
        bail!("attributes must be a map of string to value");
    };
    let Some(Value::Array(children)) = vnode.get("children") else {
        bail!("children must be an array of values");
    };

    let mut attrs_string = String::new();
    for (key, attr) in attrs {
        let key = if key == "className" {
            if matches!(attr, Value::Str(s) if s.is_empty()) {
                continue;
            }
            "class"
        } else {
            key.as_str()
        };
        match attr {
            Value::Null | Value::Bool(false) => {}
            Value::Bool(true) => {
                attrs_string.push(' ');
                attrs_string.push_str(&escape(key));
            }
            Value::Str(s) => {
                attrs_string.push_str(&format!(" {}=\"{}\"", escape(key), escape(s)));
            }
            Value::Int(_) | Value::Float(_) => {
                attrs_string.push_str(&format!(
                    " {}=\"{}\"",
                    escape(key),
                    attr.display_string()
                ));
            }
            _ => bail!("unable to render attribute type"),
        }
    }

    let is_self_closing = SELF_CLOSING.contains(&tag.as_str()) && children.is_empty();
    let mut html = format!("{indent_string}<{}{attrs_string}>\n", escape(tag));
    if !is_self_closing {
        if PRE_FORMATTED.contains(&tag.as_str()) {
            html.pop(); // keep pre-formatted content on the tag's line
            for child in children {
                html.push_str(&render(child, 0)?);
            }
            html.push_str(&format!("</{}>\n", escape(tag)));
        } else {
            for child in children {
                html.push_str(&render(child, indent + 1)?);
            }
            html.push_str(&format!("\n{indent_string}</{}>\n", escape(tag)));
        }
    }
    Ok(html)
}

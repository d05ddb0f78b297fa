use crate::sanitize::css::is_safe_css_value;
use crate::sanitize::url::safe_resource_url;
use serde::Deserialize;
use serde_json::Value;

/// How a property's raw value becomes CSS text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Bare numbers get `px`
    Length,
    /// Bare numbers stay unitless (opacity, z-index, font-weight, ...)
    Unitless,
    /// Strings pass through as written
    Keyword,
    /// Plain URLs are wrapped in `url("...")`
    Image,
}

/// Per-side box value, e.g. `padding: { top: 8, left: "1rem" }`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoxSides {
    pub top: Option<Value>,
    pub right: Option<Value>,
    pub bottom: Option<Value>,
    pub left: Option<Value>,
}

/// A style value as authored in the editor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CssValue {
    Number(f64),
    Text(String),
    Sides(BoxSides),
    Other(Value),
}

impl CssValue {
    pub fn from_json(value: &Value) -> Option<CssValue> {
        if value.is_null() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Format for a declaration, or `None` when the value is empty, unusable for this
    /// kind, or fails value hygiene.
    pub fn to_css(&self, kind: ValueKind) -> Option<String> {
        let css = match self {
            CssValue::Number(n) => number_to_css(*n, kind)?,
            CssValue::Text(s) => text_to_css(s.trim(), kind)?,
            CssValue::Sides(sides) if kind == ValueKind::Length => sides_to_css(sides)?,
            CssValue::Sides(_) | CssValue::Other(_) => return None,
        };
        if is_safe_css_value(&css) {
            Some(css)
        } else {
            tracing::debug!(value = %css, "dropping unsafe css value");
            None
        }
    }
}

/// Shortest decimal form of a finite number: `16`, `1.5`, `-0.25`.
pub fn format_number(n: f64) -> Option<String> {
    if !n.is_finite() {
        return None;
    }
    if n == 0.0 {
        return Some("0".to_string());
    }
    Some(format!("{n}"))
}

fn number_to_css(n: f64, kind: ValueKind) -> Option<String> {
    let formatted = format_number(n)?;
    match kind {
        ValueKind::Length if formatted != "0" => Some(format!("{formatted}px")),
        ValueKind::Image => None,
        _ => Some(formatted),
    }
}

fn text_to_css(s: &str, kind: ValueKind) -> Option<String> {
    if s.is_empty() {
        return None;
    }
    match kind {
        ValueKind::Length => match s.parse::<f64>() {
            Ok(n) => number_to_css(n, kind),
            Err(_) => Some(s.to_string()),
        },
        ValueKind::Image => {
            let lower = s.to_ascii_lowercase();
            if lower == "none"
                || lower.starts_with("url(")
                || lower.starts_with("linear-gradient(")
                || lower.starts_with("radial-gradient(")
                || lower.starts_with("conic-gradient(")
            {
                Some(s.to_string())
            } else {
                safe_resource_url(s, true).map(|url| format!("url(\"{}\")", url.replace('"', "%22")))
            }
        }
        ValueKind::Unitless | ValueKind::Keyword => Some(s.to_string()),
    }
}

fn side_to_css(side: Option<&Value>) -> Option<String> {
    match side? {
        Value::Number(n) => number_to_css(n.as_f64()?, ValueKind::Length),
        Value::String(s) => text_to_css(s.trim(), ValueKind::Length),
        _ => None,
    }
}

fn sides_to_css(sides: &BoxSides) -> Option<String> {
    let parts = [
        side_to_css(sides.top.as_ref()),
        side_to_css(sides.right.as_ref()),
        side_to_css(sides.bottom.as_ref()),
        side_to_css(sides.left.as_ref()),
    ];
    if parts.iter().all(Option::is_none) {
        return None;
    }
    Some(
        parts
            .into_iter()
            .map(|p| p.unwrap_or_else(|| "0".to_string()))
            .collect::<Vec<_>>()
            .join(" "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn css(v: Value, kind: ValueKind) -> Option<String> {
        CssValue::from_json(&v)?.to_css(kind)
    }

    #[test]
    fn numbers_follow_property_kind() {
        assert_eq!(css(json!(16), ValueKind::Length).as_deref(), Some("16px"));
        assert_eq!(css(json!(1.5), ValueKind::Length).as_deref(), Some("1.5px"));
        assert_eq!(css(json!(0), ValueKind::Length).as_deref(), Some("0"));
        assert_eq!(css(json!(0.5), ValueKind::Unitless).as_deref(), Some("0.5"));
        assert_eq!(css(json!(700), ValueKind::Unitless).as_deref(), Some("700"));
        assert_eq!(css(json!("24"), ValueKind::Length).as_deref(), Some("24px"));
        assert_eq!(css(json!("2rem"), ValueKind::Length).as_deref(), Some("2rem"));
    }

    #[test]
    fn empty_and_unusable_values_are_absent() {
        assert_eq!(css(json!(null), ValueKind::Keyword), None);
        assert_eq!(css(json!("  "), ValueKind::Keyword), None);
        assert_eq!(css(json!(true), ValueKind::Keyword), None);
        assert_eq!(css(json!({ "top": 1 }), ValueKind::Keyword), None);
    }

    #[test]
    fn box_sides_become_shorthand() {
        assert_eq!(
            css(json!({ "top": 8, "left": "1rem" }), ValueKind::Length).as_deref(),
            Some("8px 0 0 1rem")
        );
        assert_eq!(css(json!({}), ValueKind::Length), None);
    }

    #[test]
    fn images_are_wrapped_and_checked() {
        assert_eq!(
            css(json!("/a.png"), ValueKind::Image).as_deref(),
            Some("url(\"/a.png\")")
        );
        assert_eq!(
            css(json!("linear-gradient(red, blue)"), ValueKind::Image).as_deref(),
            Some("linear-gradient(red, blue)")
        );
        assert_eq!(css(json!("javascript:alert(1)"), ValueKind::Image), None);
        assert_eq!(css(json!("url(javascript:alert(1))"), ValueKind::Image), None);
    }

    #[test]
    fn hygiene_rejects_breakouts() {
        assert_eq!(css(json!("red;} body{display:none"), ValueKind::Keyword), None);
        assert_eq!(css(json!("</style><script>"), ValueKind::Keyword), None);
        assert_eq!(css(json!("expression(alert(1))"), ValueKind::Keyword), None);
    }
}

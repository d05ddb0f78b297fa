use super::value::{CssValue, ValueKind};
use super::Declaration;
use serde_json::{Map, Value};

/// Flat props older documents carry directly on the node: (prop key, css property, kind).
/// Later keys mapping to an already-emitted property are ignored (`textColor` after `color`).
const LEGACY_PROPERTIES: &[(&str, &str, ValueKind)] = &[
    ("padding", "padding", ValueKind::Length),
    ("margin", "margin", ValueKind::Length),
    ("backgroundColor", "background-color", ValueKind::Keyword),
    ("backgroundImage", "background-image", ValueKind::Image),
    ("color", "color", ValueKind::Keyword),
    ("textColor", "color", ValueKind::Keyword),
    ("fontFamily", "font-family", ValueKind::Keyword),
    ("fontSize", "font-size", ValueKind::Length),
    ("fontWeight", "font-weight", ValueKind::Unitless),
    ("textAlign", "text-align", ValueKind::Keyword),
    ("lineHeight", "line-height", ValueKind::Unitless),
    ("borderRadius", "border-radius", ValueKind::Length),
    ("borderWidth", "border-width", ValueKind::Length),
    ("borderColor", "border-color", ValueKind::Keyword),
    ("borderStyle", "border-style", ValueKind::Keyword),
    ("width", "width", ValueKind::Length),
    ("height", "height", ValueKind::Length),
    ("maxWidth", "max-width", ValueKind::Length),
    ("minHeight", "min-height", ValueKind::Length),
    ("gap", "gap", ValueKind::Length),
    ("opacity", "opacity", ValueKind::Unitless),
];

/// Map a node's flat props to one declaration block.
pub fn declarations(props: &Map<String, Value>) -> Vec<Declaration> {
    let mut out: Vec<Declaration> = Vec::new();
    for (key, property, kind) in LEGACY_PROPERTIES {
        if out.iter().any(|d| d.property == *property) {
            continue;
        }
        let Some(value) = props.get(*key).and_then(CssValue::from_json) else {
            continue;
        };
        if let Some(value) = value.to_css(*kind) {
            out.push(Declaration {
                property: *property,
                value,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn legacy(v: Value) -> Vec<(String, String)> {
        declarations(v.as_object().unwrap())
            .into_iter()
            .map(|d| (d.property.to_string(), d.value))
            .collect()
    }

    #[test]
    fn flat_props_map_to_declarations() {
        assert_eq!(
            legacy(json!({
                "padding": { "top": 10, "right": 20, "bottom": 10, "left": 20 },
                "backgroundColor": "#111",
                "textColor": "#eee",
                "fontSize": 14,
                "text": "ignored"
            })),
            vec![
                ("padding".to_string(), "10px 20px 10px 20px".to_string()),
                ("background-color".to_string(), "#111".to_string()),
                ("color".to_string(), "#eee".to_string()),
                ("font-size".to_string(), "14px".to_string()),
            ]
        );
    }

    #[test]
    fn color_wins_over_text_color() {
        assert_eq!(
            legacy(json!({ "color": "red", "textColor": "blue" })),
            vec![("color".to_string(), "red".to_string())]
        );
    }

    #[test]
    fn unsafe_background_image_is_dropped() {
        assert!(legacy(json!({ "backgroundImage": "javascript:alert(1)" })).is_empty());
        assert_eq!(
            legacy(json!({ "backgroundImage": "https://cdn.example/bg.jpg" })),
            vec![(
                "background-image".to_string(),
                "url(\"https://cdn.example/bg.jpg\")".to_string()
            )]
        );
    }
}

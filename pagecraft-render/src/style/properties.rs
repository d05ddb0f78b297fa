//! The typed "advanced styling" bag and its camelCase -> CSS property table.

use super::value::{CssValue, ValueKind};
use super::Declaration;
use serde::Deserialize;
use serde_json::Value;

macro_rules! style_bag {
    ($($field:ident => $css:literal : $kind:ident,)*) => {
        /// Typed CSS property bag. Keys are the editor's camelCase names; unknown keys are
        /// ignored and every field is optional.
        #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct StyleBag {
            $(pub $field: Option<CssValue>,)*
        }

        impl StyleBag {
            /// `(css property, kind, value)` in emission order.
            fn entries(&self) -> Vec<(&'static str, ValueKind, Option<&CssValue>)> {
                vec![$(($css, ValueKind::$kind, self.$field.as_ref()),)*]
            }
        }
    };
}

style_bag! {
    display => "display": Keyword,
    position => "position": Keyword,
    top => "top": Length,
    right => "right": Length,
    bottom => "bottom": Length,
    left => "left": Length,
    z_index => "z-index": Unitless,
    flex_direction => "flex-direction": Keyword,
    flex_wrap => "flex-wrap": Keyword,
    justify_content => "justify-content": Keyword,
    align_items => "align-items": Keyword,
    align_content => "align-content": Keyword,
    align_self => "align-self": Keyword,
    gap => "gap": Length,
    row_gap => "row-gap": Length,
    column_gap => "column-gap": Length,
    flex_grow => "flex-grow": Unitless,
    flex_shrink => "flex-shrink": Unitless,
    flex_basis => "flex-basis": Length,
    order => "order": Unitless,
    grid_template_columns => "grid-template-columns": Keyword,
    grid_template_rows => "grid-template-rows": Keyword,
    width => "width": Length,
    height => "height": Length,
    min_width => "min-width": Length,
    max_width => "max-width": Length,
    min_height => "min-height": Length,
    max_height => "max-height": Length,
    padding => "padding": Length,
    padding_top => "padding-top": Length,
    padding_right => "padding-right": Length,
    padding_bottom => "padding-bottom": Length,
    padding_left => "padding-left": Length,
    margin => "margin": Length,
    margin_top => "margin-top": Length,
    margin_right => "margin-right": Length,
    margin_bottom => "margin-bottom": Length,
    margin_left => "margin-left": Length,
    overflow => "overflow": Keyword,
    color => "color": Keyword,
    background_color => "background-color": Keyword,
    background_image => "background-image": Image,
    background_size => "background-size": Keyword,
    background_position => "background-position": Keyword,
    background_repeat => "background-repeat": Keyword,
    font_family => "font-family": Keyword,
    font_size => "font-size": Length,
    font_weight => "font-weight": Unitless,
    font_style => "font-style": Keyword,
    line_height => "line-height": Unitless,
    letter_spacing => "letter-spacing": Length,
    text_align => "text-align": Keyword,
    text_decoration => "text-decoration": Keyword,
    text_transform => "text-transform": Keyword,
    border => "border": Keyword,
    border_width => "border-width": Length,
    border_style => "border-style": Keyword,
    border_color => "border-color": Keyword,
    border_radius => "border-radius": Length,
    box_shadow => "box-shadow": Keyword,
    opacity => "opacity": Unitless,
    transform => "transform": Keyword,
    transition => "transition": Keyword,
    cursor => "cursor": Keyword,
    object_fit => "object-fit": Keyword,
    aspect_ratio => "aspect-ratio": Keyword,
}

impl StyleBag {
    /// Lenient read: anything that is not an object yields an empty bag.
    pub fn from_json(value: &Value) -> StyleBag {
        if !value.is_object() {
            return StyleBag::default();
        }
        serde_json::from_value(value.clone()).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "unreadable style bag");
            StyleBag::default()
        })
    }

    pub fn declarations(&self) -> Vec<Declaration> {
        self.entries()
            .into_iter()
            .filter_map(|(property, kind, value)| {
                let value = value?.to_css(kind)?;
                Some(Declaration { property, value })
            })
            .collect()
    }
}

/// Whether an `advancedStyling` value has at least one key with a non-empty value.
/// Such a node uses the advanced path exclusively.
pub fn has_any_key_set(value: Option<&Value>) -> bool {
    let Some(Value::Object(map)) = value else {
        return false;
    };
    map.values().any(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(v: Value) -> Vec<String> {
        StyleBag::from_json(&v)
            .declarations()
            .into_iter()
            .map(|d| format!("{}: {}", d.property, d.value))
            .collect()
    }

    #[test]
    fn maps_camel_case_keys_in_table_order() {
        assert_eq!(
            render(json!({
                "opacity": 0.8,
                "backgroundColor": "#fff",
                "fontSize": 18,
                "zIndex": 3,
                "unknownKey": "x",
                "display": "flex"
            })),
            vec![
                "display: flex",
                "z-index: 3",
                "background-color: #fff",
                "font-size: 18px",
                "opacity: 0.8",
            ]
        );
    }

    #[test]
    fn mistyped_or_empty_values_are_skipped() {
        assert_eq!(
            render(json!({ "color": "", "width": null, "height": true, "margin": 4 })),
            vec!["margin: 4px"]
        );
        assert!(render(json!("nope")).is_empty());
    }

    #[test]
    fn any_key_set() {
        assert!(has_any_key_set(Some(&json!({ "color": "red" }))));
        assert!(has_any_key_set(Some(&json!({ "somethingNew": 1 }))));
        assert!(!has_any_key_set(Some(&json!({ "color": "", "width": null }))));
        assert!(!has_any_key_set(Some(&json!({}))));
        assert!(!has_any_key_set(Some(&json!([1]))));
        assert!(!has_any_key_set(None));
    }
}

//! Style compiler: a node's style-override layers become `#id` scoped CSS.
//!
//! Layers, in emission order:
//! - base rule, from `advancedStyling` plus the `desktop` breakpoint entry, or from the
//!   legacy flat props when both of those are unset
//! - one rule per pseudo-state from `pseudoStateStyling`
//! - one `@media (max-width)` block per breakpoint from `breakpointStyling`, holding only
//!   declarations whose resolved value changes at that breakpoint
//! - `customCSS`, verbatim after the light strip

pub mod breakpoints;
pub mod legacy;
pub mod properties;
pub mod value;

pub use breakpoints::{resolve, Breakpoint, Responsive};
pub use properties::StyleBag;

use crate::sanitize::css::{neutralize_style_close, strip_dangerous_css};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: &'static str,
    pub value: String,
}

/// Interaction states a node can style. Variant order is emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PseudoState {
    Hover,
    Focus,
    FocusVisible,
    FocusWithin,
    Active,
}

impl PseudoState {
    pub fn parse(key: &str) -> Option<PseudoState> {
        match key {
            "hover" => Some(PseudoState::Hover),
            "focus" => Some(PseudoState::Focus),
            "focusVisible" | "focus-visible" | "focus_visible" => Some(PseudoState::FocusVisible),
            "focusWithin" | "focus-within" | "focus_within" => Some(PseudoState::FocusWithin),
            "active" => Some(PseudoState::Active),
            _ => None,
        }
    }

    pub fn selector_suffix(self) -> &'static str {
        match self {
            PseudoState::Hover => ":hover",
            PseudoState::Focus => ":focus",
            PseudoState::FocusVisible => ":focus-visible",
            PseudoState::FocusWithin => ":focus-within",
            PseudoState::Active => ":active",
        }
    }
}

type PseudoLayers = BTreeMap<PseudoState, Vec<Declaration>>;

#[derive(Debug, Clone, Default, PartialEq)]
struct BreakpointLayer {
    base: Vec<Declaration>,
    pseudo: PseudoLayers,
}

/// Which part of a layer a lookup addresses.
#[derive(Debug, Clone, Copy)]
enum LayerSlot {
    Base,
    Pseudo(PseudoState),
}

/// All style-override layers of one node, already reduced to declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleLayers {
    base: Vec<Declaration>,
    pseudo: PseudoLayers,
    breakpoints: BTreeMap<Breakpoint, BreakpointLayer>,
    custom_css: Option<String>,
}

impl StyleLayers {
    pub fn from_props(props: &Map<String, Value>) -> StyleLayers {
        let advanced = props.get("advancedStyling");
        let mut layers = StyleLayers {
            base: advanced.map(StyleBag::from_json).unwrap_or_default().declarations(),
            pseudo: pseudo_layers(props.get("pseudoStateStyling")),
            ..StyleLayers::default()
        };
        let mut uses_advanced = properties::has_any_key_set(advanced);

        if let Some(Value::Object(by_breakpoint)) = props.get("breakpointStyling") {
            for (key, raw) in by_breakpoint {
                let Some(breakpoint) = Breakpoint::parse(key) else {
                    tracing::debug!(breakpoint = %key, "ignoring unknown breakpoint");
                    continue;
                };
                let layer = BreakpointLayer {
                    base: StyleBag::from_json(raw).declarations(),
                    pseudo: pseudo_layers(raw.get("pseudoStateStyling")),
                };
                if breakpoint == Breakpoint::Desktop {
                    // desktop is the advanced bag's own width
                    uses_advanced |= !layer.base.is_empty();
                    merge_into(&mut layers.base, layer.base);
                    for (state, decls) in layer.pseudo {
                        merge_into(layers.pseudo.entry(state).or_default(), decls);
                    }
                } else {
                    layers.breakpoints.insert(breakpoint, layer);
                }
            }
        }

        if !uses_advanced {
            layers.base = legacy::declarations(props);
        }

        layers.custom_css = ["customCSS", "customCss"]
            .iter()
            .find_map(|key| props.get(*key).and_then(Value::as_str))
            .map(|css| neutralize_style_close(&strip_dangerous_css(css)))
            .map(|css| css.trim().to_string())
            .filter(|css| !css.is_empty());

        layers
    }

    /// Put `defaults` under the base layer. A default is dropped when the base already
    /// declares its property.
    pub fn with_defaults(mut self, defaults: Vec<Declaration>) -> StyleLayers {
        let mut base: Vec<Declaration> = defaults
            .into_iter()
            .filter(|d| lookup(&self.base, d.property).is_none())
            .collect();
        base.append(&mut self.base);
        self.base = base;
        self
    }

    /// Compile to CSS rules for `#element_id`, one entry per rule or media block.
    pub fn compile(&self, element_id: &str) -> Vec<String> {
        let selector = format!("#{element_id}");
        let mut rules = Vec::new();

        if !self.base.is_empty() {
            rules.push(rule(&selector, &self.base));
        }
        for (state, decls) in &self.pseudo {
            if !decls.is_empty() {
                rules.push(rule(&format!("{selector}{}", state.selector_suffix()), decls));
            }
        }

        for breakpoint in &Breakpoint::CHAIN[1..] {
            let Some(query) = breakpoint.media_query() else {
                continue;
            };
            let mut inner = Vec::new();
            let base = self.changed_at(*breakpoint, LayerSlot::Base);
            if !base.is_empty() {
                inner.push(rule(&selector, &base));
            }
            for state in self.breakpoint_states() {
                let decls = self.changed_at(*breakpoint, LayerSlot::Pseudo(state));
                if !decls.is_empty() {
                    inner.push(rule(&format!("{selector}{}", state.selector_suffix()), &decls));
                }
            }
            if !inner.is_empty() {
                let body: Vec<String> = inner.iter().map(|r| format!("  {r}")).collect();
                rules.push(format!("{query} {{\n{}\n}}", body.join("\n")));
            }
        }

        if let Some(css) = &self.custom_css {
            rules.push(css.clone());
        }
        rules
    }

    fn slot<'a>(base: &'a [Declaration], pseudo: &'a PseudoLayers, slot: LayerSlot) -> &'a [Declaration] {
        match slot {
            LayerSlot::Base => base,
            LayerSlot::Pseudo(state) => pseudo.get(&state).map(Vec::as_slice).unwrap_or_default(),
        }
    }

    fn breakpoint_states(&self) -> Vec<PseudoState> {
        let mut states: Vec<PseudoState> = self
            .breakpoints
            .values()
            .flat_map(|layer| layer.pseudo.keys().copied())
            .collect();
        states.sort();
        states.dedup();
        states
    }

    /// Declarations whose value resolved at `breakpoint` differs from the value resolved
    /// one breakpoint wider.
    fn changed_at(&self, breakpoint: Breakpoint, slot: LayerSlot) -> Vec<Declaration> {
        let mut properties: Vec<&'static str> = Vec::new();
        for layer in self.breakpoints.values() {
            for decl in Self::slot(&layer.base, &layer.pseudo, slot) {
                if !properties.contains(&decl.property) {
                    properties.push(decl.property);
                }
            }
        }

        let parent = breakpoint.parent().unwrap_or(Breakpoint::Desktop);
        properties
            .into_iter()
            .filter_map(|property| {
                let values = self.responsive_value(property, slot);
                let here = *values.resolve(breakpoint);
                let wider = *values.resolve(parent);
                match here {
                    Some(value) if here != wider => Some(Declaration {
                        property,
                        value: value.to_string(),
                    }),
                    _ => None,
                }
            })
            .collect()
    }

    fn responsive_value(&self, property: &str, slot: LayerSlot) -> Responsive<Option<&str>> {
        let mut values = Responsive::new(lookup(Self::slot(&self.base, &self.pseudo, slot), property));
        for (breakpoint, layer) in &self.breakpoints {
            if let Some(value) = lookup(Self::slot(&layer.base, &layer.pseudo, slot), property) {
                values.set(*breakpoint, Some(value));
            }
        }
        values
    }
}

fn lookup<'a>(decls: &'a [Declaration], property: &str) -> Option<&'a str> {
    decls
        .iter()
        .rev()
        .find(|d| d.property == property)
        .map(|d| d.value.as_str())
}

/// Overlay `extra` onto `target`, replacing declarations of the same property in place.
fn merge_into(target: &mut Vec<Declaration>, extra: Vec<Declaration>) {
    for decl in extra {
        match target.iter_mut().find(|d| d.property == decl.property) {
            Some(existing) => existing.value = decl.value,
            None => target.push(decl),
        }
    }
}

fn pseudo_layers(value: Option<&Value>) -> PseudoLayers {
    let mut layers = PseudoLayers::new();
    let Some(Value::Object(states)) = value else {
        return layers;
    };
    for (key, raw) in states {
        match PseudoState::parse(key) {
            Some(state) => {
                let decls = StyleBag::from_json(raw).declarations();
                if !decls.is_empty() {
                    layers.insert(state, decls);
                }
            }
            None => tracing::debug!(state = %key, "ignoring unknown pseudo-state"),
        }
    }
    layers
}

/// `selector { prop: value; prop: value; }`
fn rule(selector: &str, decls: &[Declaration]) -> String {
    let mut css = String::with_capacity(selector.len() + decls.len() * 24);
    css.push_str(selector);
    css.push_str(" {");
    for decl in decls {
        css.push(' ');
        css.push_str(decl.property);
        css.push_str(": ");
        css.push_str(&decl.value);
        css.push(';');
    }
    css.push_str(" }");
    css
}

/// Compile a node's style props for `element_id` into CSS text. Empty when the node has
/// no styling.
pub fn compile_element_css(element_id: &str, props: &Map<String, Value>) -> String {
    StyleLayers::from_props(props).compile(element_id).join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn compile(props: Value) -> Vec<String> {
        StyleLayers::from_props(props.as_object().unwrap()).compile("x")
    }

    #[test]
    fn base_rule_from_advanced_styling() {
        assert_eq!(
            compile(json!({ "advancedStyling": { "color": "#ff0000" } })),
            vec!["#x { color: #ff0000; }"]
        );
    }

    #[test]
    fn advanced_styling_supersedes_legacy_props() {
        assert_eq!(
            compile(json!({
                "padding": 10,
                "backgroundColor": "#000",
                "advancedStyling": { "margin": 4 }
            })),
            vec!["#x { margin: 4px; }"]
        );
        assert_eq!(
            compile(json!({ "padding": 10, "advancedStyling": { "color": "" } })),
            vec!["#x { padding: 10px; }"]
        );
    }

    #[test]
    fn pseudo_states_in_fixed_order() {
        assert_eq!(
            compile(json!({
                "pseudoStateStyling": {
                    "active": { "opacity": 0.5 },
                    "hover": { "color": "blue" },
                    "focusVisible": { "borderColor": "red" },
                    "visited": { "color": "purple" }
                }
            })),
            vec![
                "#x:hover { color: blue; }",
                "#x:focus-visible { border-color: red; }",
                "#x:active { opacity: 0.5; }",
            ]
        );
    }

    #[test]
    fn breakpoints_emit_only_changes() {
        let rules = compile(json!({
            "advancedStyling": { "fontSize": 32, "color": "black" },
            "breakpointStyling": {
                "mobilePortrait": { "fontSize": 20 },
                "tablet": { "fontSize": 24, "color": "black" },
                "mobile": { "fontSize": 24 }
            }
        }));
        assert_eq!(
            rules,
            vec![
                "#x { color: black; font-size: 32px; }".to_string(),
                "@media (max-width: 991px) {\n  #x { font-size: 24px; }\n}".to_string(),
                "@media (max-width: 479px) {\n  #x { font-size: 20px; }\n}".to_string(),
            ]
        );
    }

    #[test]
    fn pseudo_states_nest_inside_media_blocks() {
        let rules = compile(json!({
            "pseudoStateStyling": { "hover": { "color": "blue" } },
            "breakpointStyling": {
                "mobile": { "pseudoStateStyling": { "hover": { "color": "green" } } }
            }
        }));
        assert_eq!(
            rules,
            vec![
                "#x:hover { color: blue; }".to_string(),
                "@media (max-width: 767px) {\n  #x:hover { color: green; }\n}".to_string(),
            ]
        );
    }

    #[test]
    fn desktop_breakpoint_folds_into_base() {
        assert_eq!(
            compile(json!({
                "advancedStyling": { "color": "red", "width": 10 },
                "breakpointStyling": { "desktop": { "color": "blue" }, "tv": { "color": "x" } }
            })),
            vec!["#x { width: 10px; color: blue; }"]
        );
    }

    #[test]
    fn desktop_breakpoint_alone_supersedes_legacy_props() {
        assert_eq!(
            compile(json!({
                "padding": 10,
                "breakpointStyling": { "desktop": { "color": "blue" } }
            })),
            vec!["#x { color: blue; }"]
        );
        assert_eq!(
            compile(json!({
                "padding": 10,
                "breakpointStyling": { "desktop": { "pseudoStateStyling": { "hover": { "color": "red" } } } }
            })),
            vec!["#x { padding: 10px; }", "#x:hover { color: red; }"]
        );
    }

    #[test]
    fn defaults_sit_under_base_and_yield_to_breakpoints() {
        let height = |v: &str| Declaration {
            property: "height",
            value: v.to_string(),
        };
        let layers = |props: Value| StyleLayers::from_props(props.as_object().unwrap());

        assert_eq!(
            layers(json!({ "advancedStyling": { "color": "red" } }))
                .with_defaults(vec![height("40px")])
                .compile("x"),
            vec!["#x { height: 40px; color: red; }"]
        );
        assert_eq!(
            layers(json!({
                "advancedStyling": { "height": 100 },
                "breakpointStyling": { "mobile": { "height": 10 } }
            }))
            .with_defaults(vec![height("40px")])
            .compile("x"),
            vec![
                "#x { height: 100px; }".to_string(),
                "@media (max-width: 767px) {\n  #x { height: 10px; }\n}".to_string(),
            ]
        );
    }

    #[test]
    fn custom_css_goes_last_and_cannot_close_style() {
        let rules = compile(json!({
            "advancedStyling": { "color": "red" },
            "customCSS": " #x .icon { fill: red; } </style><script>alert(1)</script> "
        }));
        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules[1],
            r"#x .icon { fill: red; } <\/style><script>alert(1)</script>"
        );
    }

    #[test]
    fn unstyled_node_compiles_to_nothing() {
        assert!(compile(json!({ "text": "hi", "level": 2 })).is_empty());
        assert_eq!(compile_element_css("x", &Map::new()), "");
    }
}

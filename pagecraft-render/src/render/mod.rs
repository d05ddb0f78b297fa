//! Tree walker: renders a document's node tree to HTML while collecting each node's CSS.

pub mod nodes;
pub mod props;
pub mod video;

use crate::components::ComponentKind;
use crate::document::{Document, ROOT_ID};
use crate::identity::{IdentityRegistry, Scope};
use crate::style::StyleLayers;
use props::Props;
use std::collections::HashSet;

/// Deepest nesting the walker follows before treating the subtree as empty.
pub const MAX_DEPTH: usize = 256;

/// HTML plus the CSS rules its elements need, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedFragment {
    pub html: String,
    pub css_rules: Vec<String>,
}

impl RenderedFragment {
    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }

    pub fn merge(&mut self, other: RenderedFragment) {
        self.html.push_str(&other.html);
        self.css_rules.extend(other.css_rules);
    }

    /// The collected rules as one stylesheet.
    pub fn css(&self) -> String {
        self.css_rules.join("\n")
    }
}

/// Walks one document. The identity registry is borrowed so page, header and footer walks
/// share one id namespace.
pub struct TreeWalker<'d, 'r> {
    document: &'d Document,
    scope: Scope,
    identities: &'r mut IdentityRegistry,
    visited: HashSet<&'d str>,
}

impl<'d, 'r> TreeWalker<'d, 'r> {
    pub fn new(document: &'d Document, scope: Scope, identities: &'r mut IdentityRegistry) -> Self {
        Self {
            document,
            scope,
            identities,
            visited: HashSet::new(),
        }
    }

    pub fn render_root(&mut self) -> RenderedFragment {
        self.render_node(ROOT_ID)
    }

    pub fn render_node(&mut self, node_id: &str) -> RenderedFragment {
        self.visit(node_id, 0)
    }

    fn visit(&mut self, node_id: &str, depth: usize) -> RenderedFragment {
        if depth > MAX_DEPTH {
            tracing::debug!(node = %node_id, "maximum nesting depth exceeded");
            return RenderedFragment::default();
        }
        let document = self.document;
        let Some((key, node)) = document.get_key_value(node_id) else {
            tracing::debug!(node = %node_id, "dangling node reference");
            return RenderedFragment::default();
        };
        if node.hidden {
            return RenderedFragment::default();
        }
        if !self.visited.insert(key) {
            tracing::debug!(node = %node_id, "node already rendered; skipping repeat visit");
            return RenderedFragment::default();
        }

        let element_id = self.identities.assign(self.scope, node_id, &node.props);

        let mut children = RenderedFragment::default();
        for child_id in node.child_ids.iter().chain(node.slot_child_ids.values()) {
            children.merge(self.visit(child_id, depth + 1));
        }

        let mut html = String::new();
        let props = Props::new(&node.props);
        // writing into a String cannot fail
        let _ = match ComponentKind::from_type_tag(&node.type_tag) {
            Some(kind) => nodes::render_component(&mut html, kind, &element_id, props, &children.html),
            None if !children.html.is_empty() => {
                tracing::debug!(type_tag = %node.type_tag, "unknown component; rendering generic wrapper");
                nodes::render_generic(&mut html, &element_id, &node.type_tag, &children.html)
            }
            None => {
                tracing::debug!(type_tag = %node.type_tag, "unknown component without children; skipping");
                Ok(())
            }
        };
        if html.is_empty() {
            return RenderedFragment::default();
        }

        let defaults = ComponentKind::from_type_tag(&node.type_tag)
            .map(|kind| nodes::default_declarations(kind, props))
            .unwrap_or_default();
        let mut css_rules = StyleLayers::from_props(&node.props)
            .with_defaults(defaults)
            .compile(&element_id);
        css_rules.extend(children.css_rules);
        RenderedFragment { html, css_rules }
    }
}

/// Render a document's ROOT subtree into an existing id namespace.
pub fn render_document(
    document: &Document,
    scope: Scope,
    identities: &mut IdentityRegistry,
) -> RenderedFragment {
    TreeWalker::new(document, scope, identities).render_root()
}

/// Render a standalone document with a fresh id namespace.
pub fn render(document: &Document) -> RenderedFragment {
    let mut identities = IdentityRegistry::new();
    render_document(document, Scope::Page, &mut identities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc(v: serde_json::Value) -> Document {
        Document::from_value(&v)
    }

    #[test]
    fn renders_children_then_slots() {
        let fragment = render(&doc(json!({
            "ROOT": {
                "type": "Container",
                "nodes": ["b"],
                "linkedNodes": { "z": "s2", "a": "s1" }
            },
            "b": { "type": "Text", "props": { "text": "body" } },
            "s1": { "type": "Divider" },
            "s2": { "type": "Spacer", "props": { "height": 8 } }
        })));
        assert_eq!(
            fragment.html,
            "<div id=\"pc-ROOT\" class=\"pc-container\">\
             <div id=\"pc-b\" class=\"pc-text\">body</div>\
             <hr id=\"pc-s1\" class=\"pc-divider\">\
             <div id=\"pc-s2\" class=\"pc-spacer\" aria-hidden=\"true\"></div>\
             </div>"
        );
        assert_eq!(fragment.css_rules, vec!["#pc-s2 { height: 8px; }"]);
    }

    #[test]
    fn spacer_height_yields_to_breakpoint_overrides() {
        let fragment = render(&doc(json!({
            "ROOT": {
                "type": "Spacer",
                "props": {
                    "advancedStyling": { "height": 100 },
                    "breakpointStyling": { "mobile": { "height": 10 } }
                }
            }
        })));
        assert!(!fragment.html.contains("style="));
        assert_eq!(
            fragment.css_rules,
            vec![
                "#pc-ROOT { height: 100px; }".to_string(),
                "@media (max-width: 767px) {\n  #pc-ROOT { height: 10px; }\n}".to_string(),
            ]
        );

        let fragment = render(&doc(json!({ "ROOT": { "type": "Spacer" } })));
        assert_eq!(fragment.css_rules, vec!["#pc-ROOT { height: 40px; }"]);
    }

    #[test]
    fn css_follows_document_order() {
        let fragment = render(&doc(json!({
            "ROOT": { "type": "Section", "nodes": ["a"], "props": { "backgroundColor": "#000" } },
            "a": { "type": "Heading", "props": { "advancedStyling": { "color": "#fff" } } }
        })));
        assert_eq!(
            fragment.css_rules,
            vec!["#pc-ROOT { background-color: #000; }", "#pc-a { color: #fff; }"]
        );
    }

    #[test]
    fn missing_root_and_dangling_children_render_empty() {
        assert_eq!(render(&doc(json!({}))), RenderedFragment::default());
        let fragment = render(&doc(json!({
            "ROOT": { "type": "Row", "nodes": ["ghost"] }
        })));
        assert_eq!(fragment.html, "<div id=\"pc-ROOT\" class=\"pc-row\"></div>");
    }

    #[test]
    fn cycles_terminate() {
        let fragment = render(&doc(json!({
            "ROOT": { "type": "Container", "nodes": ["a"] },
            "a": { "type": "Container", "nodes": ["ROOT", "a", "b"] },
            "b": { "type": "Text", "props": { "text": "once" } }
        })));
        assert_eq!(fragment.html.matches("once").count(), 1);
        assert_eq!(fragment.html.matches("pc-ROOT").count(), 1);
    }

    #[test]
    fn unknown_kinds_wrap_children_or_vanish() {
        let fragment = render(&doc(json!({
            "ROOT": { "type": "Mystery", "nodes": ["a", "b"] },
            "a": { "type": "Divider" },
            "b": { "type": "AlsoUnknown", "props": { "advancedStyling": { "color": "red" } } }
        })));
        assert_eq!(
            fragment.html,
            "<div id=\"pc-ROOT\" class=\"pc-block\" data-component=\"Mystery\"><hr id=\"pc-a\" class=\"pc-divider\"></div>"
        );
        assert!(fragment.css_rules.is_empty());
    }

    #[test]
    fn deep_trees_are_cut_off() {
        let mut value = serde_json::Map::new();
        for i in 0..400 {
            let id = if i == 0 { "ROOT".to_string() } else { format!("n{i}") };
            value.insert(id, json!({ "type": "Container", "nodes": [format!("n{}", i + 1)] }));
        }
        let fragment = render(&Document::from_value(&serde_json::Value::Object(value)));
        assert_eq!(fragment.html.matches("<div").count(), MAX_DEPTH + 1);
    }
}

use crate::error::{RenderError, RenderResult};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Id of the node every document renders from.
pub const ROOT_ID: &str = "ROOT";

const TYPE_KEYS: &[&str] = &["type", "typeTag"];
const CHILD_KEYS: &[&str] = &["nodes", "children", "childIds"];
const SLOT_KEYS: &[&str] = &["linkedNodes", "slots", "namedSlotChildIds"];
const PARENT_KEYS: &[&str] = &["parent", "parentId"];

/// One element of the editor's node tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub type_tag: String,
    pub props: Map<String, Value>,
    /// Ordinary children, in document order
    pub child_ids: Vec<String>,
    /// Named-slot children, keyed (and rendered in order) by slot name
    pub slot_child_ids: BTreeMap<String, String>,
    pub hidden: bool,
    pub parent_id: Option<String>,
}

impl Node {
    /// Read a node from its serialized form. Returns `None` when the entry is not an object;
    /// every individual field falls back to its default when missing or mistyped.
    pub fn from_value(value: &Value) -> Option<Node> {
        let obj = value.as_object()?;

        let type_tag = match first_of(obj, TYPE_KEYS) {
            Some(Value::String(tag)) => tag.clone(),
            Some(Value::Object(resolved)) => resolved
                .get("resolvedName")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            _ => String::new(),
        };

        let props = obj
            .get("props")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let child_ids = CHILD_KEYS
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_array))
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let slot_child_ids = SLOT_KEYS
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_object))
            .map(|slots| {
                slots
                    .iter()
                    .filter_map(|(slot, id)| id.as_str().map(|id| (slot.clone(), id.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let hidden = obj.get("hidden").and_then(Value::as_bool).unwrap_or(false);

        let parent_id = first_of(obj, PARENT_KEYS)
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(Node {
            type_tag,
            props,
            child_ids,
            slot_child_ids,
            hidden,
            parent_id,
        })
    }
}

fn first_of<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| obj.get(*key))
}

/// A page's or template's node tree: node id -> node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    nodes: HashMap<String, Node>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lenient load from an already-parsed JSON value. Non-object input yields an empty
    /// document; entries that are not objects are skipped.
    pub fn from_value(value: &Value) -> Self {
        let Some(entries) = value.as_object() else {
            return Self::default();
        };
        let nodes = entries
            .iter()
            .filter_map(|(id, raw)| Node::from_value(raw).map(|node| (id.clone(), node)))
            .collect();
        Self { nodes }
    }

    /// Lenient load from JSON text. Unparseable text yields an empty document.
    pub fn from_json_str(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(err) => {
                tracing::warn!(error = %err, "unparseable content JSON; rendering an empty document");
                Self::default()
            }
        }
    }

    /// Lenient load from a stored `contentJson` value, which may be an object or a string
    /// holding JSON.
    pub fn from_content(content: &Value) -> Self {
        match content {
            Value::Object(_) => Self::from_value(content),
            Value::String(raw) => Self::from_json_str(raw),
            Value::Null => Self::default(),
            other => {
                tracing::warn!(kind = json_kind(other), "content JSON is not an object");
                Self::default()
            }
        }
    }

    /// Strict load used by tooling: the text must be a JSON object with a ROOT node.
    pub fn parse_strict(raw: &str) -> RenderResult<Self> {
        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(RenderError::NotAnObject);
        }
        let document = Self::from_value(&value);
        if document.root().is_none() {
            return Err(RenderError::MissingRoot {
                root: ROOT_ID.to_string(),
            });
        }
        Ok(document)
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// The stored id alongside the node, for callers that keep borrowed ids around.
    pub fn get_key_value(&self, id: &str) -> Option<(&str, &Node)> {
        self.nodes
            .get_key_value(id)
            .map(|(key, node)| (key.as_str(), node))
    }

    pub fn root(&self) -> Option<&Node> {
        self.get(ROOT_ID)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_editor_shaped_nodes() {
        let doc = Document::from_value(&json!({
            "ROOT": {
                "type": { "resolvedName": "Container" },
                "nodes": ["a"],
                "linkedNodes": { "footer": "b" },
                "props": { "padding": 8 }
            },
            "a": { "type": "Heading", "parent": "ROOT", "hidden": true },
            "b": { "typeTag": "Text", "parentId": "ROOT" }
        }));

        let root = doc.root().unwrap();
        assert_eq!(root.type_tag, "Container");
        assert_eq!(root.child_ids, vec!["a"]);
        assert_eq!(root.slot_child_ids.get("footer").map(String::as_str), Some("b"));
        assert_eq!(doc.get("a").unwrap().parent_id.as_deref(), Some("ROOT"));
        assert!(doc.get("a").unwrap().hidden);
        assert_eq!(doc.get("b").unwrap().type_tag, "Text");
    }

    #[test]
    fn skips_malformed_entries() {
        let doc = Document::from_value(&json!({
            "ROOT": { "children": ["a", 7, null, "b"], "hidden": "yes" },
            "a": "not a node",
            "b": { "props": [] }
        }));

        assert_eq!(doc.len(), 2);
        let root = doc.root().unwrap();
        assert_eq!(root.child_ids, vec!["a", "b"]);
        assert!(!root.hidden);
        assert!(doc.get("a").is_none());
        assert!(doc.get("b").unwrap().props.is_empty());
    }

    #[test]
    fn content_may_be_a_json_string() {
        let content = json!("{\"ROOT\":{\"type\":\"Container\"}}");
        assert!(Document::from_content(&content).root().is_some());
        assert!(Document::from_content(&json!("{broken")).is_empty());
        assert!(Document::from_content(&json!(42)).is_empty());
    }

    #[test]
    fn strict_parse_requires_root() {
        assert!(matches!(
            Document::parse_strict("{\"a\":{}}"),
            Err(RenderError::MissingRoot { .. })
        ));
        assert!(matches!(Document::parse_strict("[]"), Err(RenderError::NotAnObject)));
        assert!(matches!(Document::parse_strict("{"), Err(RenderError::InvalidJson(_))));
        assert!(Document::parse_strict("{\"ROOT\":{}}").is_ok());
    }
}

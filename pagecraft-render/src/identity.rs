use serde_json::{Map, Value};
use std::collections::HashSet;

/// Which tree of a composed document a node belongs to. Derived element ids carry the
/// scope prefix so page, header and footer nodes with equal node ids stay apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Page,
    Header,
    Footer,
    NotFound,
}

impl Scope {
    pub fn prefix(self) -> &'static str {
        match self {
            Scope::Page => "pc",
            Scope::Header => "hd",
            Scope::Footer => "ft",
            Scope::NotFound => "nf",
        }
    }
}

/// Hands out element ids that are unique across one composed document.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    claimed: HashSet<String>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the element id for a node: the authored `metadata.elementId` when usable,
    /// else `<scope>-<node id token>`. Collisions get `-2`, `-3`, ... in claim order.
    pub fn assign(&mut self, scope: Scope, node_id: &str, props: &Map<String, Value>) -> String {
        let base = authored_element_id(props)
            .unwrap_or_else(|| format!("{}-{}", scope.prefix(), sanitize_token(node_id)));
        self.claim(base)
    }

    pub fn claim(&mut self, base: String) -> String {
        if self.claimed.insert(base.clone()) {
            return base;
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{base}-{n}");
            if self.claimed.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

fn authored_element_id(props: &Map<String, Value>) -> Option<String> {
    let raw = props
        .get("metadata")
        .and_then(Value::as_object)
        .and_then(|meta| meta.get("elementId"))
        .and_then(Value::as_str)?;
    let token = sanitize_token(raw.trim());
    if token.is_empty() || token == "node" {
        return None;
    }
    if token.starts_with(|c: char| c.is_ascii_alphabetic()) {
        Some(token)
    } else {
        Some(format!("el-{token}"))
    }
}

/// Restrict a string to an HTML id / class token: `[A-Za-z0-9_-]`, other characters
/// become `-`, runs collapse, leading/trailing dashes trimmed. Empty input maps to `node`.
pub fn sanitize_token(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "node".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn derives_scoped_ids() {
        let mut reg = IdentityRegistry::new();
        assert_eq!(reg.assign(Scope::Page, "abc", &Map::new()), "pc-abc");
        assert_eq!(reg.assign(Scope::Header, "abc", &Map::new()), "hd-abc");
        assert_eq!(reg.assign(Scope::Footer, "a b/c", &Map::new()), "ft-a-b-c");
    }

    #[test]
    fn collisions_get_numeric_suffixes() {
        let mut reg = IdentityRegistry::new();
        assert_eq!(reg.assign(Scope::Page, "a.b", &Map::new()), "pc-a-b");
        assert_eq!(reg.assign(Scope::Page, "a b", &Map::new()), "pc-a-b-2");
        assert_eq!(reg.assign(Scope::Page, "a/b", &Map::new()), "pc-a-b-3");
    }

    #[test]
    fn authored_ids_win_and_are_sanitized() {
        let mut reg = IdentityRegistry::new();
        let hero = props(json!({ "metadata": { "elementId": "hero banner" } }));
        assert_eq!(reg.assign(Scope::Page, "x", &hero), "hero-banner");
        assert_eq!(reg.assign(Scope::Footer, "y", &hero), "hero-banner-2");

        let numeric = props(json!({ "metadata": { "elementId": "42" } }));
        assert_eq!(reg.assign(Scope::Page, "z", &numeric), "el-42");

        let blank = props(json!({ "metadata": { "elementId": "  " } }));
        assert_eq!(reg.assign(Scope::Page, "w", &blank), "pc-w");
    }

    #[test]
    fn token_sanitizer_never_returns_empty() {
        assert_eq!(sanitize_token(""), "node");
        assert_eq!(sanitize_token("\"><"), "node");
        assert_eq!(sanitize_token("--ok__1--"), "ok__1");
    }
}

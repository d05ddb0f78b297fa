use crate::sanitize::url::safe_link_url;
use serde_json::{Map, Value};

/// Read-only view over a node's props with the lenient accessors every renderer uses.
/// Mistyped values read as absent.
#[derive(Debug, Clone, Copy)]
pub struct Props<'a> {
    map: &'a Map<String, Value>,
}

/// A resolved, scheme-checked link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub new_tab: bool,
}

impl Link {
    /// ` href="..."` plus target/rel attributes for new-tab links.
    pub fn attributes(&self) -> String {
        let mut attrs = format!(" href=\"{}\"", crate::sanitize::escape_attribute(&self.href));
        if self.new_tab {
            attrs.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
        }
        attrs
    }
}

impl<'a> Props<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    /// Non-empty string value, trimmed.
    pub fn str(&self, key: &str) -> Option<&'a str> {
        self.map
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// First non-empty string among `keys`.
    pub fn first_str(&self, keys: &[&str]) -> Option<&'a str> {
        keys.iter().find_map(|key| self.str(key))
    }

    /// Text content: strings as-is (untrimmed), numbers formatted.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.map.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.map.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s == "true" => Some(true),
            Value::String(s) if s == "false" => Some(false),
            _ => None,
        }
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        let n: f64 = match self.map.get(key)? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().trim_end_matches("px").parse().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }

    /// Link from `href` / `link` / `url`, with `target="_blank"` or `openInNewTab`.
    /// Unsafe schemes collapse to `#`; `None` when no link prop is set.
    pub fn link(&self) -> Option<Link> {
        let raw = self.first_str(&["href", "link", "url"])?;
        let href = safe_link_url(raw).unwrap_or_else(|| {
            tracing::debug!(href = %raw, "refusing unsafe link");
            "#".to_string()
        });
        let new_tab = self.str("target") == Some("_blank") || self.bool("openInNewTab") == Some(true);
        Some(Link { href, new_tab })
    }
}

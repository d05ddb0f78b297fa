//! CSS hygiene: the light strip applied to author CSS and the stricter checks applied to
//! single declaration values.

use super::url::safe_resource_url;
use regex::Regex;
use std::sync::OnceLock;

fn dangerous_css_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)expression\s*\(|(?:java|vb)script\s*:|@import|-moz-binding|behavior\s*:")
            .expect("static regex")
    })
}

fn css_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)]*?))\s*\)"#).expect("static regex")
    })
}

fn style_close_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</(style)").expect("static regex"))
}

fn property_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?[a-zA-Z][a-zA-Z0-9-]*$").expect("static regex"))
}

pub fn contains_dangerous_css(css: &str) -> bool {
    dangerous_css_regex().is_match(css)
}

/// Remove `expression(`, `javascript:`/`vbscript:`, `@import`, `-moz-binding` and
/// `behavior:` until none remain. Repeats because removal can splice a new match together
/// (`@imp@importort`).
pub fn strip_dangerous_css(css: &str) -> String {
    let mut current = css.to_string();
    loop {
        let next = dangerous_css_regex().replace_all(&current, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Make CSS safe to place inside a `<style>` element.
pub fn neutralize_style_close(css: &str) -> String {
    style_close_regex().replace_all(css, r"<\/$1").into_owned()
}

/// Every `url(...)` in the value must point at a safe resource.
fn urls_are_safe(value: &str) -> bool {
    css_url_regex().captures_iter(value).all(|caps| {
        let target = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();
        safe_resource_url(target, true).is_some()
    })
}

/// Whether a single declaration value may be emitted.
pub fn is_safe_css_value(value: &str) -> bool {
    !value.trim().is_empty()
        && !value.contains(['<', '>', '{', '}', ';', '\\'])
        && !contains_dangerous_css(value)
        && urls_are_safe(value)
}

/// Clean an inline `style` attribute declaration by declaration. Returns `None` when
/// nothing survives.
pub fn clean_inline_style(style: &str) -> Option<String> {
    let stripped = strip_dangerous_css(style);
    let declarations: Vec<String> = stripped
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim();
            (property_name_regex().is_match(&prop) && is_safe_css_value(value))
                .then(|| format!("{prop}: {value}"))
        })
        .collect();
    if declarations.is_empty() {
        None
    } else {
        Some(declarations.join("; "))
    }
}

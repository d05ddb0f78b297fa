//! URL scheme checks shared by the sanitizer, the node renderers and the style compiler.
//!
//! Inputs are expected to be already entity-decoded.

use ::url::Url;

const LINK_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];
const RESOURCE_SCHEMES: &[&str] = &["http", "https"];
const DATA_IMAGE_TYPES: &[&str] = &[
    "data:image/png",
    "data:image/jpeg",
    "data:image/jpg",
    "data:image/gif",
    "data:image/webp",
    "data:image/avif",
    "data:image/bmp",
];

/// Hosts an `<iframe>` may point at.
pub const EMBED_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "youtube-nocookie.com",
    "www.youtube-nocookie.com",
    "player.vimeo.com",
    "www.loom.com",
    "fast.wistia.net",
];

/// Remove control characters (tab and newlines included) and trim surrounding whitespace.
/// Browsers ignore these inside URLs, so `java\tscript:` must not slip past the check.
pub fn clean_url(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Lowercased scheme of a URL, or `None` when the URL is relative.
fn scheme_of(cleaned: &str) -> Option<String> {
    let compact: String = cleaned.chars().filter(|c| !c.is_whitespace()).collect();
    let colon = compact.find(':')?;
    let delimiter = compact.find(['/', '?', '#']).unwrap_or(usize::MAX);
    if colon < delimiter {
        Some(compact[..colon].to_ascii_lowercase())
    } else {
        None
    }
}

/// A link target (`href`) that is relative or uses http, https, mailto or tel.
pub fn safe_link_url(raw: &str) -> Option<String> {
    let cleaned = clean_url(raw);
    if cleaned.is_empty() {
        return None;
    }
    match scheme_of(&cleaned) {
        None => Some(cleaned),
        Some(scheme) if LINK_SCHEMES.contains(&scheme.as_str()) => Some(cleaned),
        Some(_) => None,
    }
}

/// A loadable resource (`src`, `poster`, CSS `url()`): relative, http(s), and optionally a
/// raster `data:image/` URL. SVG data URLs are refused since they can carry script.
pub fn safe_resource_url(raw: &str, allow_data_image: bool) -> Option<String> {
    let cleaned = clean_url(raw);
    if cleaned.is_empty() {
        return None;
    }
    match scheme_of(&cleaned) {
        None => Some(cleaned),
        Some(scheme) if RESOURCE_SCHEMES.contains(&scheme.as_str()) => Some(cleaned),
        Some(scheme) if scheme == "data" && allow_data_image => {
            let lower = cleaned.to_ascii_lowercase();
            DATA_IMAGE_TYPES
                .iter()
                .any(|prefix| {
                    lower.starts_with(prefix)
                        && matches!(lower.as_bytes().get(prefix.len()), Some(b';') | Some(b','))
                })
                .then_some(cleaned)
        }
        Some(_) => None,
    }
}

/// An `<iframe src>` that is https and points at one of the [`EMBED_HOSTS`].
pub fn safe_embed_url(raw: &str) -> Option<String> {
    let cleaned = clean_url(raw);
    let parsed = Url::parse(&cleaned).ok()?;
    if parsed.scheme() != "https" {
        return None;
    }
    let host = parsed.host_str()?.to_ascii_lowercase();
    EMBED_HOSTS.contains(&host.as_str()).then_some(cleaned)
}

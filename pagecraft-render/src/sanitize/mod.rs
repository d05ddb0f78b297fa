//! HTML escaping and allowlist sanitization.
//!
//! `sanitize` is total: whatever the input, it returns markup that is safe under the chosen
//! policy. Untrusted markup is tokenized, filtered and re-serialized; nothing from the input
//! reaches the output without passing through an escaper.

pub mod css;
pub mod tokenizer;
pub mod url;

use std::borrow::Cow;
use std::fmt::Write;
use tokenizer::{Attribute, Token, Tokenizer};

/// Sanitization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Rich text: tag allowlist, attribute filtering, dangerous elements dropped.
    RichContent,
    /// Raw HTML blocks: like `RichContent` but any well-formed tag name that is not
    /// dangerous is kept.
    HtmlBlock,
    /// Admin-authored head/footer code. Passed through verbatim apart from a light strip
    /// of embedded CSS.
    TrustedCode,
}

const RICH_ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "address", "article", "aside", "audio", "b", "bdi", "bdo", "blockquote", "br",
    "caption", "cite", "code", "col", "colgroup", "dd", "del", "details", "dfn", "div", "dl",
    "dt", "em", "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "i", "iframe", "img", "ins", "kbd", "li", "main", "mark", "nav", "ol", "p", "picture",
    "pre", "q", "s", "samp", "section", "small", "source", "span", "strong", "sub", "summary",
    "sup", "table", "tbody", "td", "tfoot", "th", "thead", "time", "tr", "track", "u", "ul",
    "video", "wbr",
];

/// Removed together with everything inside them, under every untrusted policy.
const DROP_WITH_CONTENT: &[&str] = &[
    "script", "style", "template", "object", "embed", "applet", "base", "meta", "link", "frame",
    "frameset", "noscript", "title", "textarea", "xmp", "plaintext", "svg", "math",
];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const URL_ATTRIBUTES: &[&str] = &[
    "href", "src", "poster", "cite", "action", "formaction", "xlink:href", "background",
];

/// Attributes removed outright. Element ids belong to the renderer.
const BLOCKED_ATTRIBUTES: &[&str] = &["id", "srcdoc", "srcset", "name", "form", "is"];

/// Escape text for use in element content or a quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `escape_html` plus the backtick, which some legacy parsers treat as a quote.
pub fn escape_attribute(s: &str) -> String {
    escape_html(s).replace('`', "&#96;")
}

/// Decode the character references that matter for rich text and URL checks: a handful of
/// named entities and every decimal/hex numeric reference (the `;` is optional for numeric
/// ones, as browsers accept it). Unknown references are left untouched.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match decode_reference(after) {
            Some((decoded, consumed)) => {
                out.push(decoded);
                rest = &after[consumed..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Decode the reference at the start of `s` (just past the `&`). Returns the character and
/// the number of bytes consumed.
fn decode_reference(s: &str) -> Option<(char, usize)> {
    if let Some(numeric) = s.strip_prefix('#') {
        let (radix, digits_start) = match numeric.as_bytes().first() {
            Some(b'x') | Some(b'X') => (16, 2),
            _ => (10, 1),
        };
        let digits: String = s[digits_start..]
            .chars()
            .take_while(|c| c.is_digit(radix))
            .collect();
        if digits.is_empty() {
            return None;
        }
        let mut consumed = digits_start + digits.len();
        if s[consumed..].starts_with(';') {
            consumed += 1;
        }
        let decoded = u32::from_str_radix(&digits, radix)
            .ok()
            .filter(|cp| *cp != 0)
            .and_then(char::from_u32)
            .unwrap_or('\u{FFFD}');
        return Some((decoded, consumed));
    }

    const NAMED: &[(&str, char, bool)] = &[
        // (name, char, semicolon required)
        ("amp", '&', false),
        ("lt", '<', false),
        ("gt", '>', false),
        ("quot", '"', false),
        ("apos", '\'', true),
        ("nbsp", '\u{a0}', false),
        ("colon", ':', true),
        ("tab", '\t', true),
        ("newline", '\n', true),
    ];
    let lower_head: String = s.chars().take(8).collect::<String>().to_ascii_lowercase();
    NAMED.iter().find_map(|(name, c, needs_semicolon)| {
        if !lower_head.starts_with(name) {
            return None;
        }
        let has_semicolon = s[name.len()..].starts_with(';');
        if has_semicolon {
            Some((*c, name.len() + 1))
        } else if !needs_semicolon {
            Some((*c, name.len()))
        } else {
            None
        }
    })
}

/// Escape markup text (still carrying its character references) for output. References
/// this module decodes are decoded and re-escaped. Any other well-formed named reference
/// (`&copy;`, `&mdash;`) passes through as written; a bare `&` becomes `&amp;`.
fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&escape_html(&rest[..amp]));
        let after = &rest[amp + 1..];
        let decoded = decode_reference(after);
        match named_reference_len(after) {
            Some(len) if decoded.is_none_or(|(_, consumed)| consumed < len) => {
                out.push('&');
                out.push_str(&after[..len]);
                rest = &after[len..];
            }
            _ => match decoded {
                Some((c, consumed)) => {
                    out.push_str(&escape_html(c.encode_utf8(&mut [0; 4])));
                    rest = &after[consumed..];
                }
                None => {
                    out.push_str("&amp;");
                    rest = after;
                }
            },
        }
    }
    out.push_str(&escape_html(rest));
    out
}

/// Length of a `name;` reference at the start of `s`, semicolon included. Names are an
/// ASCII letter then 1 to 31 letters or digits.
fn named_reference_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if !bytes.first()?.is_ascii_alphabetic() {
        return None;
    }
    let name_len = bytes.iter().take_while(|b| b.is_ascii_alphanumeric()).count();
    ((2..=32).contains(&name_len) && bytes.get(name_len) == Some(&b';')).then_some(name_len + 1)
}

/// Sanitize a fragment of HTML under `policy`.
pub fn sanitize(raw: &str, policy: Policy) -> String {
    match policy {
        Policy::TrustedCode => sanitize_trusted(raw),
        Policy::RichContent => Sanitizer::new(true).run(raw),
        Policy::HtmlBlock => Sanitizer::new(false).run(raw),
    }
}

/// Skipped region: the element being dropped and how deeply it is nested in itself.
struct Skip {
    name: String,
    depth: usize,
}

struct Sanitizer {
    filter_tags: bool,
    out: String,
    open: Vec<String>,
    skip: Option<Skip>,
}

impl Sanitizer {
    fn new(filter_tags: bool) -> Self {
        Self {
            filter_tags,
            out: String::new(),
            open: Vec::new(),
            skip: None,
        }
    }

    fn run(mut self, raw: &str) -> String {
        for spanned in Tokenizer::new(raw) {
            if self.skipping(&spanned.token) {
                continue;
            }
            match spanned.token {
                Token::Text(text) => self.out.push_str(&escape_text(text)),
                Token::RawText(text) => self.out.push_str(&escape_html(text)),
                Token::StartTag {
                    name,
                    attrs,
                    self_closing,
                } => self.start_tag(name, &attrs, self_closing),
                Token::EndTag { name } => self.end_tag(&name),
                Token::Comment(_) | Token::Bogus => {}
            }
        }
        while let Some(name) = self.open.pop() {
            let _ = write!(self.out, "</{name}>");
        }
        self.out
    }

    /// Consume tokens inside a dropped element. Returns true while the token is swallowed.
    fn skipping(&mut self, token: &Token<'_>) -> bool {
        let Some(skip) = self.skip.as_mut() else {
            return false;
        };
        let mut done = false;
        match token {
            Token::StartTag {
                name, self_closing, ..
            } if *name == skip.name && !*self_closing => skip.depth += 1,
            Token::EndTag { name } if *name == skip.name => {
                skip.depth -= 1;
                done = skip.depth == 0;
            }
            _ => {}
        }
        if done {
            self.skip = None;
        }
        true
    }

    fn drop_element(&mut self, name: String, self_closing: bool) {
        if !self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
            self.skip = Some(Skip { name, depth: 1 });
        }
    }

    fn start_tag(&mut self, name: String, attrs: &[Attribute<'_>], self_closing: bool) {
        if DROP_WITH_CONTENT.contains(&name.as_str()) {
            tracing::debug!(tag = %name, "dropping element and its content");
            self.drop_element(name, self_closing);
            return;
        }
        if !is_valid_tag_name(&name) {
            return;
        }
        if self.filter_tags && !RICH_ALLOWED_TAGS.contains(&name.as_str()) {
            // unwrapped: the tag goes, its content stays
            return;
        }

        let mut kept: Vec<KeptAttribute> = attrs
            .iter()
            .filter_map(|attr| filter_attribute(&name, attr))
            .collect();

        if name == "iframe" {
            let has_embed_src = kept
                .iter()
                .any(|a| a.name == "src" && url::safe_embed_url(&a.value).is_some());
            if !has_embed_src {
                tracing::debug!("dropping iframe with a non-allowlisted source");
                self.drop_element(name, self_closing);
                return;
            }
        }

        if name == "a" {
            let new_tab = kept
                .iter()
                .any(|a| a.name == "target" && a.value.eq_ignore_ascii_case("_blank"));
            if new_tab {
                kept.retain(|a| a.name != "rel");
                kept.push(KeptAttribute::escaped("rel", "noopener noreferrer".to_string()));
            }
        }

        self.out.push('<');
        self.out.push_str(&name);
        for attr in &kept {
            let _ = write!(self.out, " {}=\"{}\"", attr.name, attr.html);
        }
        self.out.push('>');

        if !VOID_ELEMENTS.contains(&name.as_str()) {
            self.open.push(name);
        }
    }

    fn end_tag(&mut self, name: &str) {
        let Some(at) = self.open.iter().rposition(|open| open == name) else {
            return;
        };
        while self.open.len() > at {
            if let Some(open) = self.open.pop() {
                let _ = write!(self.out, "</{open}>");
            }
        }
    }
}

fn is_valid_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

/// An attribute that survived filtering.
struct KeptAttribute {
    name: String,
    /// Decoded value, for checks.
    value: String,
    /// Value as written inside the quotes.
    html: String,
}

impl KeptAttribute {
    fn escaped(name: &str, value: String) -> Self {
        Self {
            name: name.to_string(),
            html: escape_attribute(&value),
            value,
        }
    }
}

/// Decide whether an attribute survives and with which value. URL and style values are
/// written fully escaped from their decoded form.
fn filter_attribute(tag: &str, attr: &Attribute<'_>) -> Option<KeptAttribute> {
    let name = attr.name.as_str();
    if !is_valid_attribute_name(name)
        || name.starts_with("on")
        || BLOCKED_ATTRIBUTES.contains(&name)
    {
        return None;
    }
    let raw = attr.value.unwrap_or_default();
    let value = decode_entities(raw);

    if name == "style" {
        return css::clean_inline_style(&value).map(|css| KeptAttribute::escaped(name, css));
    }
    if URL_ATTRIBUTES.contains(&name) {
        let url = match name {
            "href" | "cite" | "action" | "formaction" | "xlink:href" => url::safe_link_url(&value),
            _ => {
                let images_allowed = matches!(tag, "img" | "source" | "picture" | "video");
                url::safe_resource_url(&value, images_allowed)
            }
        };
        return url.map(|url| KeptAttribute::escaped(name, url));
    }
    Some(KeptAttribute {
        name: name.to_string(),
        value: value.into_owned(),
        html: escape_text(raw).replace('`', "&#96;"),
    })
}

/// Trusted code passes through verbatim; only CSS inside `<style>` elements and `style`
/// attributes gets the dangerous-pattern strip.
fn sanitize_trusted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_style = false;
    for spanned in Tokenizer::new(raw) {
        let verbatim = &raw[spanned.span.clone()];
        match spanned.token {
            Token::RawText(text) if in_style => {
                out.push_str(&css::neutralize_style_close(&css::strip_dangerous_css(text)));
            }
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => {
                in_style = name == "style" && !self_closing;
                if attrs.iter().any(|a| a.name == "style") {
                    rebuild_trusted_tag(&mut out, &name, &attrs, self_closing);
                } else {
                    out.push_str(verbatim);
                }
            }
            Token::EndTag { .. } => {
                in_style = false;
                out.push_str(verbatim);
            }
            _ => out.push_str(verbatim),
        }
    }
    out
}

fn rebuild_trusted_tag(out: &mut String, name: &str, attrs: &[Attribute<'_>], self_closing: bool) {
    out.push('<');
    out.push_str(name);
    for attr in attrs {
        match (attr.name.as_str(), attr.value) {
            ("style", Some(value)) => {
                let cleaned = css::strip_dangerous_css(&decode_entities(value));
                let _ = write!(out, " style=\"{}\"", escape_attribute(&cleaned));
            }
            (attr_name, Some(value)) => {
                let _ = write!(
                    out,
                    " {}=\"{}\"",
                    attr_name,
                    escape_attribute(&decode_entities(value))
                );
            }
            (attr_name, None) => {
                let _ = write!(out, " {attr_name}");
            }
        }
    }
    out.push_str(if self_closing { " />" } else { ">" });
}

//! Byte-level HTML tokenizer used by the sanitizer.
//!
//! Not a conforming HTML5 parser. It splits markup into the token kinds the sanitizer cares
//! about and never panics: every delimiter it looks for is ASCII, so slice boundaries always
//! land on char boundaries. Anything it cannot make sense of is reported as `Bogus`.

use std::ops::Range;

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed", "noframes", "noscript",
    "plaintext",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute<'a> {
    /// Lowercased name
    pub name: String,
    /// Raw (still entity-encoded) value; `None` for a bare attribute
    pub value: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Text(&'a str),
    /// Content of a raw-text element such as `<script>` or `<style>`
    RawText(&'a str),
    StartTag {
        name: String,
        attrs: Vec<Attribute<'a>>,
        self_closing: bool,
    },
    EndTag {
        name: String,
    },
    Comment(&'a str),
    /// Doctype, processing instruction, or markup that never terminates
    Bogus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<'a> {
    pub token: Token<'a>,
    pub span: Range<usize>,
}

pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    raw_text_end: Option<String>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            raw_text_end: None,
        }
    }

    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn emit(&mut self, token: Token<'a>, start: usize, end: usize) -> Option<Spanned<'a>> {
        self.pos = end;
        Some(Spanned {
            token,
            span: start..end,
        })
    }

    fn raw_text(&mut self, name: String) -> Option<Spanned<'a>> {
        let start = self.pos;
        let end = if name == "plaintext" {
            self.src.len()
        } else {
            find_end_tag(self.bytes(), start, &name).unwrap_or(self.src.len())
        };
        if end == start {
            return self.next();
        }
        self.emit(Token::RawText(&self.src[start..end]), start, end)
    }

    fn text(&mut self, start: usize) -> Option<Spanned<'a>> {
        let bytes = self.bytes();
        let mut end = start + 1;
        while end < bytes.len() && !(bytes[end] == b'<' && starts_markup(bytes, end)) {
            end += 1;
        }
        self.emit(Token::Text(&self.src[start..end]), start, end)
    }

    fn comment(&mut self, start: usize) -> Option<Spanned<'a>> {
        let body_start = start + 4;
        match find(self.bytes(), body_start, b"-->") {
            Some(close) => self.emit(
                Token::Comment(&self.src[body_start..close]),
                start,
                close + 3,
            ),
            None => self.emit(Token::Bogus, start, self.src.len()),
        }
    }

    fn bogus(&mut self, start: usize) -> Option<Spanned<'a>> {
        match find(self.bytes(), start, b">") {
            Some(close) => self.emit(Token::Bogus, start, close + 1),
            None => self.emit(Token::Bogus, start, self.src.len()),
        }
    }

    fn end_tag(&mut self, start: usize) -> Option<Spanned<'a>> {
        let bytes = self.bytes();
        let name_start = start + 2;
        let mut i = name_start;
        while i < bytes.len() && !is_space(bytes[i]) && bytes[i] != b'>' && bytes[i] != b'/' {
            i += 1;
        }
        let name = self.src[name_start..i].to_ascii_lowercase();
        match find(bytes, i, b">") {
            Some(close) => self.emit(Token::EndTag { name }, start, close + 1),
            None => self.emit(Token::Bogus, start, self.src.len()),
        }
    }

    fn start_tag(&mut self, start: usize) -> Option<Spanned<'a>> {
        let bytes = self.bytes();
        let len = bytes.len();
        let mut i = start + 1;
        while i < len && !is_space(bytes[i]) && bytes[i] != b'>' && bytes[i] != b'/' {
            i += 1;
        }
        let name = self.src[start + 1..i].to_ascii_lowercase();
        let mut attrs: Vec<Attribute<'a>> = Vec::new();
        let mut self_closing = false;

        loop {
            while i < len && (is_space(bytes[i]) || bytes[i] == b'/') {
                if bytes[i] == b'/' && i + 1 < len && bytes[i + 1] == b'>' {
                    self_closing = true;
                }
                i += 1;
            }
            if i >= len {
                return self.emit(Token::Bogus, start, len);
            }
            if bytes[i] == b'>' {
                i += 1;
                break;
            }

            // attribute name; always consume at least one byte
            let name_start = i;
            i += 1;
            while i < len
                && !is_space(bytes[i])
                && bytes[i] != b'='
                && bytes[i] != b'>'
                && bytes[i] != b'/'
            {
                i += 1;
            }
            let attr_name = self.src[name_start..i].to_ascii_lowercase();

            let mut j = i;
            while j < len && is_space(bytes[j]) {
                j += 1;
            }
            let mut value = None;
            if j < len && bytes[j] == b'=' {
                j += 1;
                while j < len && is_space(bytes[j]) {
                    j += 1;
                }
                if j >= len {
                    return self.emit(Token::Bogus, start, len);
                }
                if bytes[j] == b'"' || bytes[j] == b'\'' {
                    let quote = bytes[j];
                    let Some(close) = find(bytes, j + 1, &[quote]) else {
                        return self.emit(Token::Bogus, start, len);
                    };
                    value = Some(&self.src[j + 1..close]);
                    i = close + 1;
                } else {
                    let value_start = j;
                    while j < len && !is_space(bytes[j]) && bytes[j] != b'>' {
                        j += 1;
                    }
                    value = Some(&self.src[value_start..j]);
                    i = j;
                }
            }

            if !attrs.iter().any(|a| a.name == attr_name) {
                attrs.push(Attribute {
                    name: attr_name,
                    value,
                });
            }
        }

        if !self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            self.raw_text_end = Some(name.clone());
        }
        self.emit(
            Token::StartTag {
                name,
                attrs,
                self_closing,
            },
            start,
            i,
        )
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Spanned<'a>;

    fn next(&mut self) -> Option<Spanned<'a>> {
        if let Some(name) = self.raw_text_end.take() {
            if self.pos < self.src.len() {
                return self.raw_text(name);
            }
        }
        let bytes = self.bytes();
        let start = self.pos;
        if start >= bytes.len() {
            return None;
        }
        if bytes[start] != b'<' || !starts_markup(bytes, start) {
            return self.text(start);
        }
        match bytes.get(start + 1) {
            Some(b'!') if bytes[start..].starts_with(b"<!--") => self.comment(start),
            Some(b'!') | Some(b'?') => self.bogus(start),
            Some(b'/') => match bytes.get(start + 2) {
                Some(c) if c.is_ascii_alphabetic() => self.end_tag(start),
                _ => self.bogus(start),
            },
            _ => self.start_tag(start),
        }
    }
}

/// Whether the `<` at `at` opens markup rather than being literal text.
fn starts_markup(bytes: &[u8], at: usize) -> bool {
    match bytes.get(at + 1) {
        Some(c) if c.is_ascii_alphabetic() => true,
        Some(b'!') | Some(b'?') => true,
        Some(b'/') => matches!(bytes.get(at + 2), Some(c) if c.is_ascii_alphabetic() || *c == b'>'),
        _ => false,
    }
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() || needle.is_empty() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Position of the `</name` that closes a raw-text element, matched case-insensitively.
fn find_end_tag(bytes: &[u8], from: usize, name: &str) -> Option<usize> {
    let name = name.as_bytes();
    let mut at = from;
    while let Some(lt) = find(bytes, at, b"</") {
        let name_end = lt + 2 + name.len();
        if name_end <= bytes.len() && bytes[lt + 2..name_end].eq_ignore_ascii_case(name) {
            match bytes.get(name_end) {
                None => return Some(lt),
                Some(b) if is_space(*b) || *b == b'>' || *b == b'/' => return Some(lt),
                _ => {}
            }
        }
        at = lt + 2;
    }
    None
}

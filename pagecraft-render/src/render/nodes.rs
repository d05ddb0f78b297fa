//! One renderer per component kind. Each writes a single outermost element carrying the
//! node's element id, so the compiled `#id` rules always find their element.

use super::props::Props;
use super::video::render_video;
use crate::components::{ComponentKind, CONTAINER_TAGS};
use crate::identity::sanitize_token;
use crate::sanitize::url::safe_resource_url;
use crate::sanitize::{escape_attribute, escape_html, sanitize, Policy};
use crate::style::value::format_number;
use crate::style::Declaration;
use serde_json::Value;
use std::fmt::{self, Write};

const DEFAULT_SPACER_HEIGHT: &str = "40";
const DEFAULT_ICON_SIZE: f64 = 24.0;
const DEFAULT_HEADING_LEVEL: u8 = 2;

pub fn render_component(
    out: &mut String,
    kind: ComponentKind,
    id: &str,
    props: Props<'_>,
    children: &str,
) -> fmt::Result {
    let raw_id = id;
    let id = escape_attribute(id);
    match kind {
        ComponentKind::Container => {
            let tag = props
                .str("htmlTag")
                .map(str::to_ascii_lowercase)
                .filter(|t| CONTAINER_TAGS.contains(&t.as_str()))
                .unwrap_or_else(|| "div".to_string());
            write!(out, "<{tag} id=\"{id}\" class=\"pc-container\">{children}</{tag}>")
        }
        ComponentKind::Section => write!(
            out,
            "<section id=\"{id}\" class=\"pc-section\"><div class=\"pc-section-inner\">{children}</div></section>"
        ),
        ComponentKind::Row => write!(out, "<div id=\"{id}\" class=\"pc-row\">{children}</div>"),
        ComponentKind::Column => {
            write!(out, "<div id=\"{id}\" class=\"pc-column\">{children}</div>")
        }
        ComponentKind::Text => {
            let body = ["text", "html", "content"]
                .iter()
                .find_map(|key| props.text(key))
                .map(|raw| sanitize(&raw, Policy::RichContent))
                .unwrap_or_default();
            write!(out, "<div id=\"{id}\" class=\"pc-text\">{body}{children}</div>")
        }
        ComponentKind::Heading => render_heading(out, &id, props, children),
        ComponentKind::Image => render_image(out, &id, props, children),
        ComponentKind::Button => {
            let text = props.text("text").unwrap_or_else(|| "Button".to_string());
            let link = props.link().map(|l| l.attributes()).unwrap_or_else(|| " href=\"#\"".to_string());
            let class = match props.str("variant") {
                Some(variant) => format!("pc-button pc-button-{}", sanitize_token(variant)),
                None => "pc-button".to_string(),
            };
            write!(
                out,
                "<a id=\"{id}\" class=\"{class}\"{link}>{}{children}</a>",
                escape_html(&text)
            )
        }
        ComponentKind::Link => {
            let link = props.link();
            let text = props
                .text("text")
                .or_else(|| link.as_ref().map(|l| l.href.clone()))
                .unwrap_or_default();
            let attrs = link.map(|l| l.attributes()).unwrap_or_else(|| " href=\"#\"".to_string());
            write!(
                out,
                "<a id=\"{id}\" class=\"pc-link\"{attrs}>{}{children}</a>",
                escape_html(&text)
            )
        }
        ComponentKind::Divider => write!(out, "<hr id=\"{id}\" class=\"pc-divider\">"),
        ComponentKind::Spacer => write!(
            out,
            "<div id=\"{id}\" class=\"pc-spacer\" aria-hidden=\"true\"></div>"
        ),
        ComponentKind::Icon => {
            write!(out, "<span id=\"{id}\" class=\"pc-icon\"")?;
            write_icon_body(out, props)?;
            out.push_str("</span>");
            Ok(())
        }
        ComponentKind::IconText => render_icon_text(out, &id, props, children),
        ComponentKind::Video => render_video(out, raw_id, props, children),
        ComponentKind::HtmlBlock => {
            let body = ["html", "code", "content"]
                .iter()
                .find_map(|key| props.text(key))
                .map(|raw| sanitize(&raw, Policy::HtmlBlock))
                .unwrap_or_default();
            write!(out, "<div id=\"{id}\" class=\"pc-html\">{body}{children}</div>")
        }
        ComponentKind::List => render_list(out, &id, props, children),
    }
}

/// Base declarations a kind carries before its own styling. Overridden by any base
/// declaration of the same property, and by every breakpoint layer.
pub fn default_declarations(kind: ComponentKind, props: Props<'_>) -> Vec<Declaration> {
    match kind {
        ComponentKind::Spacer => {
            let height = props
                .f64("height")
                .filter(|h| *h >= 0.0)
                .and_then(format_number)
                .unwrap_or_else(|| DEFAULT_SPACER_HEIGHT.to_string());
            vec![Declaration {
                property: "height",
                value: format!("{height}px"),
            }]
        }
        _ => Vec::new(),
    }
}

/// Wrapper for type tags the renderer does not know.
pub fn render_generic(out: &mut String, id: &str, type_tag: &str, children: &str) -> fmt::Result {
    write!(
        out,
        "<div id=\"{}\" class=\"pc-block\" data-component=\"{}\">{}</div>",
        escape_attribute(id),
        escape_attribute(type_tag),
        children
    )
}

fn heading_level(props: Props<'_>) -> u8 {
    let level = props.f64("level").or_else(|| {
        props
            .str("level")
            .and_then(|l| l.strip_prefix(['h', 'H']))
            .and_then(|l| l.parse().ok())
    });
    match level {
        Some(l) => l.round().clamp(1.0, 6.0) as u8,
        None => DEFAULT_HEADING_LEVEL,
    }
}

fn render_heading(out: &mut String, id: &str, props: Props<'_>, children: &str) -> fmt::Result {
    let level = heading_level(props);
    let text = escape_html(&props.text("text").unwrap_or_default());
    match props.link() {
        Some(link) => write!(
            out,
            "<h{level} id=\"{id}\"><a{}>{text}</a>{children}</h{level}>",
            link.attributes()
        ),
        None => write!(out, "<h{level} id=\"{id}\">{text}{children}</h{level}>"),
    }
}

fn render_image(out: &mut String, id: &str, props: Props<'_>, children: &str) -> fmt::Result {
    let alt = props.str("alt").unwrap_or_default();
    let Some(src) = props
        .first_str(&["src", "url", "image"])
        .and_then(|src| safe_resource_url(src, true))
    else {
        let label = if alt.is_empty() { "Image" } else { alt };
        return write!(
            out,
            "<div id=\"{id}\" class=\"pc-image-placeholder\" role=\"img\" aria-label=\"{}\">{children}</div>",
            escape_attribute(label)
        );
    };

    let caption = props.text("caption");
    let link = props.link().filter(|_| props.get("href").is_some() || props.get("link").is_some());
    let framed = caption.is_some() || !children.is_empty();

    let mut img = String::from("<img");
    if !framed && link.is_none() {
        write!(img, " id=\"{id}\"")?;
    }
    write!(
        img,
        " class=\"pc-image\" src=\"{}\" alt=\"{}\" loading=\"lazy\" decoding=\"async\"",
        escape_attribute(&src),
        escape_attribute(alt)
    )?;
    for key in ["width", "height"] {
        if let Some(px) = props.f64(key).filter(|v| *v > 0.0).and_then(format_number) {
            write!(img, " {key}=\"{px}\"")?;
        }
    }
    img.push('>');

    let linked = match &link {
        Some(link) if framed => format!("<a{}>{img}</a>", link.attributes()),
        Some(link) => format!(
            "<a id=\"{id}\" class=\"pc-image-link\"{}>{img}</a>",
            link.attributes()
        ),
        None => img,
    };

    if framed {
        write!(out, "<figure id=\"{id}\" class=\"pc-image-figure\">{linked}")?;
        if let Some(caption) = caption {
            write!(out, "<figcaption>{}</figcaption>", escape_html(&caption))?;
        }
        write!(out, "{children}</figure>")
    } else {
        out.push_str(&linked);
        Ok(())
    }
}

/// `role`, label and placeholder SVG of an icon, closing the opening tag started by the
/// caller.
fn write_icon_body(out: &mut String, props: Props<'_>) -> fmt::Result {
    let name = props.first_str(&["name", "icon"]).unwrap_or("star");
    let label = props.first_str(&["label", "ariaLabel", "alt"]).unwrap_or(name);
    let size = props
        .f64("size")
        .filter(|s| *s > 0.0)
        .unwrap_or(DEFAULT_ICON_SIZE);
    let size = format_number(size).unwrap_or_else(|| "24".to_string());
    write!(
        out,
        " role=\"img\" aria-label=\"{}\" data-icon=\"{}\">\
         <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" viewBox=\"0 0 24 24\" \
         fill=\"none\" stroke=\"currentColor\" stroke-width=\"2\" aria-hidden=\"true\" focusable=\"false\">\
         <circle cx=\"12\" cy=\"12\" r=\"10\"></circle></svg>",
        escape_attribute(label),
        escape_attribute(&sanitize_token(name))
    )
}

fn render_icon_text(out: &mut String, id: &str, props: Props<'_>, children: &str) -> fmt::Result {
    write!(out, "<div id=\"{id}\" class=\"pc-icon-text\"><span class=\"pc-icon\"")?;
    write_icon_body(out, props)?;
    out.push_str("</span><div class=\"pc-icon-text-body\">");
    if let Some(title) = props.text("title") {
        write!(out, "<h3 class=\"pc-icon-text-title\">{}</h3>", escape_html(&title))?;
    }
    if let Some(description) = props.first_str(&["description", "text"]) {
        write!(
            out,
            "<div class=\"pc-icon-text-description\">{}</div>",
            sanitize(description, Policy::RichContent)
        )?;
    }
    write!(out, "{children}</div></div>")
}

fn render_list(out: &mut String, id: &str, props: Props<'_>, children: &str) -> fmt::Result {
    let ordered = props.bool("ordered").unwrap_or(false)
        || matches!(props.str("listType"), Some("ordered" | "ol" | "numbered"));
    let tag = if ordered { "ol" } else { "ul" };
    write!(out, "<{tag} id=\"{id}\" class=\"pc-list\">")?;
    if let Some(Value::Array(items)) = props.get("items") {
        for item in items {
            let text = match item {
                Value::String(s) => Some(s.as_str()),
                Value::Object(obj) => obj.get("text").and_then(Value::as_str),
                _ => None,
            };
            if let Some(text) = text {
                write!(out, "<li>{}</li>", escape_html(text))?;
            }
        }
    }
    write!(out, "{children}</{tag}>")
}

//! # Pagecraft page renderer
//!
//! Turns a visual-builder document (a JSON map of node id to typed, styled node) into
//! sanitized HTML plus the CSS its elements need, and composes full public pages from a
//! page body, header/footer templates and site settings.
//!
//! ## Features
//! - Lenient document loading: malformed trees render best-effort, never panic
//! - Allowlist HTML sanitizer for rich text and raw HTML blocks
//! - Layered style compiler (legacy props, advanced styling, pseudo-states, breakpoints)
//! - Page composition with template fallback, SEO head tags, `robots.txt` and `sitemap.xml`
//!
//! ## Example
//! ```ignore
//! use pagecraft_render::{render, Document};
//!
//! let doc = Document::from_json_str(r#"{
//!   "ROOT": { "type": "Container", "nodes": ["a"] },
//!   "a": { "type": "Heading", "props": { "text": "Hi", "advancedStyling": { "color": "#f00" } } }
//! }"#);
//!
//! let fragment = render(&doc);
//! assert!(fragment.html.contains("<h2 id=\"pc-a\">Hi</h2>"));
//! assert_eq!(fragment.css_rules, vec!["#pc-a { color: #f00; }"]);
//! ```

pub mod components;
pub mod compose;
pub mod document;
pub mod error;
pub mod identity;
pub mod render;
pub mod routing;
pub mod sanitize;
pub mod style;

// --- Core types ---
pub use components::ComponentKind;
pub use document::{Document, Node, ROOT_ID};
pub use error::{RenderError, RenderResult};
pub use identity::{IdentityRegistry, Scope};
pub use render::{render, render_document, RenderedFragment, TreeWalker};
pub use routing::{classify_path, Route};
pub use sanitize::{escape_attribute, escape_html, sanitize, Policy};
pub use style::breakpoints::{Breakpoint, Responsive};
pub use style::{compile_element_css, StyleLayers};

// --- Composition ---
pub use compose::seo::{build_robots_txt, build_sitemap_xml, SitemapEntry};
pub use compose::settings::{
    PageData, PageSettings, SiteSettings, Template, TemplateCatalog, TemplateType,
};
pub use compose::{compose_404, compose_page, NotFoundContext, PageRenderContext};

/// Render a document given as JSON text, rejecting text that is not a document with a
/// ROOT node.
pub fn render_json(json: &str) -> RenderResult<RenderedFragment> {
    Ok(render(&Document::parse_strict(json)?))
}

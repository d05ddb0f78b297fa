//! Document composer: page body, header/footer templates, head metadata and site code
//! assembled into one HTML document.

pub mod head;
pub mod seo;
pub mod settings;

use crate::identity::{IdentityRegistry, Scope};
use crate::render::{render_document, RenderedFragment};
use crate::sanitize::css::{neutralize_style_close, strip_dangerous_css};
use crate::sanitize::{escape_attribute, sanitize, Policy};
use head::{write_head, HeadMeta};
use settings::{PageData, PageSettings, SiteSettings, Template, TemplateCatalog, TemplateType};
use std::fmt::{self, Write};

/// Reset and component defaults emitted ahead of every document's own rules.
pub const BASE_STYLES: &str = "\
*, *::before, *::after { box-sizing: border-box; }
html { -webkit-text-size-adjust: 100%; }
body { margin: 0; font-family: system-ui, -apple-system, \"Segoe UI\", Roboto, sans-serif; line-height: 1.5; }
img, video, iframe { max-width: 100%; }
img { height: auto; display: block; }
.pc-main { display: block; }
.pc-section { width: 100%; }
.pc-section-inner { max-width: 1200px; margin: 0 auto; }
.pc-container { display: block; }
.pc-row { display: flex; flex-wrap: wrap; }
.pc-column { flex: 1 1 0; min-width: 0; }
.pc-image-figure { margin: 0; }
.pc-image-placeholder { background: #e5e7eb; min-height: 120px; }
.pc-button { display: inline-block; padding: 10px 20px; border-radius: 4px; text-decoration: none; cursor: pointer; }
.pc-button-primary { background: #2563eb; color: #fff; }
.pc-button-secondary { background: #e5e7eb; color: #111827; }
.pc-button-outline { border: 1px solid currentColor; color: inherit; }
.pc-divider { border: 0; border-top: 1px solid #e5e7eb; }
.pc-icon { display: inline-flex; width: 24px; height: 24px; }
.pc-icon svg { width: 100%; height: 100%; }
.pc-icon-text { display: flex; gap: 12px; align-items: flex-start; }
.pc-video { position: relative; }
.pc-video iframe { width: 100%; aspect-ratio: 16 / 9; border: 0; }
.pc-video-placeholder { background: #111827; aspect-ratio: 16 / 9; }
.pc-not-found { padding: 96px 24px; text-align: center; }";

/// Everything one page request needs, built fresh per request.
#[derive(Debug, Clone)]
pub struct PageRenderContext {
    pub page: PageData,
    pub page_settings: PageSettings,
    pub site_settings: SiteSettings,
    pub templates: TemplateCatalog,
}

impl PageRenderContext {
    pub fn new(page: PageData, site_settings: SiteSettings, templates: TemplateCatalog) -> Self {
        let page_settings = PageSettings::from_value(&page.settings);
        Self {
            page,
            page_settings,
            site_settings,
            templates,
        }
    }
}

/// Inputs for the not-found document.
#[derive(Debug, Clone, Default)]
pub struct NotFoundContext {
    pub site_settings: SiteSettings,
    pub templates: TemplateCatalog,
}

fn render_template(template: Option<&Template>, scope: Scope, ids: &mut IdentityRegistry) -> RenderedFragment {
    match template {
        Some(template) => render_document(&template.document(), scope, ids),
        None => RenderedFragment::default(),
    }
}

/// `pc-page` followed by the authored classes, each restricted to `[A-Za-z0-9_-]`.
pub fn body_class(custom: Option<&str>) -> String {
    let mut class = String::from("pc-page");
    for token in custom.unwrap_or_default().split_whitespace() {
        let token: String = token
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        if !token.is_empty() {
            class.push(' ');
            class.push_str(&token);
        }
    }
    class
}

fn custom_css(css: Option<&str>) -> Option<String> {
    let css = neutralize_style_close(&strip_dangerous_css(css?));
    let css = css.trim();
    (!css.is_empty()).then(|| css.to_string())
}

fn trusted(code: &[Option<&str>]) -> Vec<String> {
    code.iter()
        .flatten()
        .map(|c| sanitize(c, Policy::TrustedCode))
        .filter(|c| !c.trim().is_empty())
        .collect()
}

/// The parts of a composed document, in output order.
struct Layout<'a> {
    language: &'a str,
    meta: HeadMeta,
    stylesheet: String,
    head_code: Vec<String>,
    body_class: String,
    header: RenderedFragment,
    main: String,
    footer: RenderedFragment,
    footer_code: Vec<String>,
}

impl Layout<'_> {
    fn write(&self, out: &mut String) -> fmt::Result {
        out.push_str("<!DOCTYPE html>\n");
        writeln!(out, "<html lang=\"{}\">", escape_attribute(self.language))?;
        write_head(out, &self.meta, &self.stylesheet, &self.head_code)?;
        writeln!(out, "<body class=\"{}\">", escape_attribute(&self.body_class))?;
        if !self.header.is_empty() {
            writeln!(out, "<header class=\"pc-site-header\">{}</header>", self.header.html)?;
        }
        writeln!(out, "<main class=\"pc-main\">{}</main>", self.main)?;
        if !self.footer.is_empty() {
            writeln!(out, "<footer class=\"pc-site-footer\">{}</footer>", self.footer.html)?;
        }
        for code in &self.footer_code {
            out.push_str(code);
            out.push('\n');
        }
        out.push_str("</body>\n</html>\n");
        Ok(())
    }

    fn into_html(self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write(&mut out);
        out
    }
}

fn stylesheet(parts: &[&RenderedFragment], custom: Option<String>) -> String {
    let mut css = String::from(BASE_STYLES);
    for rule in parts.iter().flat_map(|fragment| fragment.css_rules.iter()) {
        css.push('\n');
        css.push_str(rule);
    }
    if let Some(custom) = custom {
        css.push('\n');
        css.push_str(&custom);
    }
    css
}

/// Compose a full HTML document for a page.
pub fn compose_page(ctx: &PageRenderContext) -> String {
    let site = &ctx.site_settings;
    let settings = &ctx.page_settings;
    let mut ids = IdentityRegistry::new();

    let page = render_document(&ctx.page.document(), Scope::Page, &mut ids);
    let header = if settings.disable_header {
        RenderedFragment::default()
    } else {
        let template = ctx
            .templates
            .resolve(ctx.page.header_template_id, TemplateType::Header);
        render_template(template, Scope::Header, &mut ids)
    };
    let footer = if settings.disable_footer {
        RenderedFragment::default()
    } else {
        let template = ctx
            .templates
            .resolve(ctx.page.footer_template_id, TemplateType::Footer);
        render_template(template, Scope::Footer, &mut ids)
    };

    tracing::debug!(
        slug = %ctx.page.slug,
        rules = page.css_rules.len() + header.css_rules.len() + footer.css_rules.len(),
        "composed page"
    );

    Layout {
        language: &site.language,
        meta: HeadMeta::for_page(&ctx.page.title, &ctx.page.slug, settings, site),
        stylesheet: stylesheet(
            &[&page, &header, &footer],
            custom_css(settings.custom_code.css.as_deref()),
        ),
        head_code: trusted(&[site.head_code.as_deref(), settings.custom_code.head.as_deref()]),
        body_class: body_class(settings.custom_body_class.as_deref()),
        header,
        main: page.html,
        footer,
        footer_code: trusted(&[site.footer_code.as_deref(), settings.custom_code.footer.as_deref()]),
    }
    .into_html()
}

const BUILT_IN_NOT_FOUND: &str = "<section class=\"pc-not-found\"><h1>Page not found</h1>\
<p>The page you are looking for does not exist or has been moved.</p>\
<a class=\"pc-button pc-button-primary\" href=\"/\">Back to home</a></section>";

/// Compose the not-found document: the published `notfound` template, else a built-in
/// section, framed by the site's system header and footer.
pub fn compose_404(ctx: &NotFoundContext) -> String {
    let site = &ctx.site_settings;
    let mut ids = IdentityRegistry::new();

    let mut body = render_template(
        ctx.templates.published_system(TemplateType::NotFound),
        Scope::NotFound,
        &mut ids,
    );
    if body.is_empty() {
        body.html = BUILT_IN_NOT_FOUND.to_string();
    }
    let header = render_template(
        ctx.templates.published_system(TemplateType::Header),
        Scope::Header,
        &mut ids,
    );
    let footer = render_template(
        ctx.templates.published_system(TemplateType::Footer),
        Scope::Footer,
        &mut ids,
    );

    Layout {
        language: &site.language,
        meta: HeadMeta::for_not_found(site),
        stylesheet: stylesheet(&[&body, &header, &footer], None),
        head_code: trusted(&[site.head_code.as_deref()]),
        body_class: body_class(Some("pc-not-found-page")),
        header,
        main: body.html,
        footer,
        footer_code: trusted(&[site.footer_code.as_deref()]),
    }
    .into_html()
}

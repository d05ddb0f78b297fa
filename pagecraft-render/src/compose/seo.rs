//! `robots.txt` and `sitemap.xml`.

use super::head::page_url;
use super::settings::{PageData, PageSettings, SiteSettings};
use chrono::{DateTime, Utc};
use std::fmt::Write;

pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// One candidate page for the sitemap.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub slug: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub published: bool,
    pub is_template: bool,
    pub no_index: bool,
}

impl SitemapEntry {
    pub fn from_page(page: &PageData) -> Self {
        Self {
            slug: page.slug.clone(),
            updated_at: page.updated_at,
            published: page.published,
            is_template: page.is_template,
            no_index: PageSettings::from_value(&page.settings).seo.no_index,
        }
    }

    fn listed(&self) -> bool {
        self.published && !self.is_template && !self.no_index && !self.slug.trim().is_empty()
    }
}

pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn build_robots_txt(site: &SiteSettings) -> String {
    if let Some(custom) = &site.robots_txt {
        let mut body = custom.clone();
        if !body.ends_with('\n') {
            body.push('\n');
        }
        return body;
    }
    let mut body = String::from("User-agent: *\n");
    if site.discourage_search_engines {
        body.push_str("Disallow: /\n");
    } else {
        body.push_str("Allow: /\n");
    }
    if let Some(base) = site.base_url() {
        body.push_str(&format!("\nSitemap: {base}/sitemap.xml\n"));
    }
    body
}

/// Sitemap of every published, indexable, non-template page, in the order given. Without a
/// site URL the locations are root-relative paths.
pub fn build_sitemap_xml(site: &SiteSettings, entries: &[SitemapEntry]) -> String {
    let base = site.base_url().unwrap_or("");
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(xml, "<urlset xmlns=\"{SITEMAP_NAMESPACE}\">");
    for entry in entries.iter().filter(|e| e.listed()) {
        let loc = page_url(base, &entry.slug, &site.homepage_slug);
        xml.push_str("  <url>\n");
        let _ = writeln!(xml, "    <loc>{}</loc>", xml_escape(&loc));
        if let Some(updated) = entry.updated_at {
            let _ = writeln!(xml, "    <lastmod>{}</lastmod>", updated.format("%Y-%m-%d"));
        }
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

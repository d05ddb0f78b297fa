use super::settings::{PageSettings, SiteSettings};
use crate::sanitize::url::{safe_link_url, safe_resource_url};
use crate::sanitize::{escape_attribute, escape_html};
use std::fmt::{self, Write};

/// Robots directives for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Robots {
    pub no_index: bool,
    pub no_follow: bool,
}

impl Robots {
    pub fn content(self) -> &'static str {
        match (self.no_index, self.no_follow) {
            (false, false) => "index, follow",
            (true, false) => "noindex, follow",
            (false, true) => "index, nofollow",
            (true, true) => "noindex, nofollow",
        }
    }
}

/// Everything the `<head>` of a composed document carries, already resolved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeadMeta {
    pub title: String,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub canonical_url: Option<String>,
    pub robots: Robots,
    pub favicon: Option<String>,
    pub site_name: Option<String>,
    pub og_title: String,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    /// `None` leaves out Open Graph and Twitter tags entirely (not-found documents).
    pub og_type: Option<&'static str>,
}

/// Title shown in the browser: an SEO title verbatim, else the page title suffixed with the
/// site title.
pub fn document_title(seo_title: Option<&str>, page_title: &str, site_title: Option<&str>) -> String {
    if let Some(title) = seo_title.map(str::trim).filter(|t| !t.is_empty()) {
        return title.to_string();
    }
    let page_title = page_title.trim();
    match (page_title.is_empty(), site_title) {
        (false, Some(site)) if site != page_title => format!("{page_title} | {site}"),
        (false, _) => page_title.to_string(),
        (true, Some(site)) => site.to_string(),
        (true, None) => String::new(),
    }
}

/// Public URL of a page. The homepage maps to the site root.
pub fn page_url(base_url: &str, slug: &str, homepage_slug: &str) -> String {
    let slug = slug.trim_matches('/');
    if slug.is_empty() || slug == homepage_slug {
        format!("{base_url}/")
    } else {
        format!("{base_url}/{slug}")
    }
}

/// Make a site-relative image path absolute so social crawlers can fetch it.
fn absolute_image(raw: &str, site: &SiteSettings) -> Option<String> {
    let url = safe_resource_url(raw, false)?;
    if url.starts_with('/') && !url.starts_with("//") {
        if let Some(base) = site.base_url() {
            return Some(format!("{base}{url}"));
        }
    }
    Some(url)
}

impl HeadMeta {
    /// Head for a published page.
    pub fn for_page(title: &str, slug: &str, page: &PageSettings, site: &SiteSettings) -> Self {
        let seo = &page.seo;
        let title = document_title(seo.title.as_deref(), title, site.title.as_deref());
        let description = seo.description.clone().or_else(|| site.description.clone());
        let canonical_url = seo
            .canonical_url
            .as_deref()
            .and_then(safe_link_url)
            .or_else(|| site.base_url().map(|base| page_url(base, slug, &site.homepage_slug)));
        let og_image = page
            .social
            .og_image
            .as_deref()
            .or(site.default_og_image.as_deref())
            .and_then(|img| absolute_image(img, site));

        Self {
            og_title: page.social.og_title.clone().unwrap_or_else(|| title.clone()),
            og_description: page
                .social
                .og_description
                .clone()
                .or_else(|| description.clone()),
            title,
            description,
            keywords: seo.keywords.clone(),
            canonical_url,
            robots: Robots {
                no_index: seo.no_index || site.discourage_search_engines,
                no_follow: seo.no_follow || site.discourage_search_engines,
            },
            favicon: site.favicon.clone(),
            site_name: site.title.clone(),
            og_image,
            og_type: Some("website"),
        }
    }

    /// Head for the not-found document: never indexed, no canonical or social tags.
    pub fn for_not_found(site: &SiteSettings) -> Self {
        let title = document_title(None, "Page not found", site.title.as_deref());
        Self {
            og_title: title.clone(),
            title,
            description: site.description.clone(),
            robots: Robots {
                no_index: true,
                no_follow: site.discourage_search_engines,
            },
            favicon: site.favicon.clone(),
            site_name: site.title.clone(),
            ..Self::default()
        }
    }
}

fn meta_name(out: &mut String, name: &str, content: &str) -> fmt::Result {
    writeln!(out, "<meta name=\"{name}\" content=\"{}\">", escape_attribute(content))
}

fn meta_property(out: &mut String, property: &str, content: &str) -> fmt::Result {
    writeln!(out, "<meta property=\"{property}\" content=\"{}\">", escape_attribute(content))
}

/// Write the `<head>` element. `stylesheet` must already be safe to embed in `<style>`;
/// `head_code` fragments are appended verbatim after it.
pub fn write_head(out: &mut String, meta: &HeadMeta, stylesheet: &str, head_code: &[String]) -> fmt::Result {
    out.push_str("<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    writeln!(out, "<title>{}</title>", escape_html(&meta.title))?;
    if let Some(description) = &meta.description {
        meta_name(out, "description", description)?;
    }
    if let Some(keywords) = &meta.keywords {
        meta_name(out, "keywords", keywords)?;
    }
    meta_name(out, "robots", meta.robots.content())?;
    if let Some(canonical) = &meta.canonical_url {
        writeln!(out, "<link rel=\"canonical\" href=\"{}\">", escape_attribute(canonical))?;
    }

    if let Some(og_type) = meta.og_type {
        meta_property(out, "og:type", og_type)?;
        meta_property(out, "og:title", &meta.og_title)?;
        if let Some(description) = &meta.og_description {
            meta_property(out, "og:description", description)?;
        }
        if let Some(url) = &meta.canonical_url {
            meta_property(out, "og:url", url)?;
        }
        if let Some(site_name) = &meta.site_name {
            meta_property(out, "og:site_name", site_name)?;
        }
        if let Some(image) = &meta.og_image {
            meta_property(out, "og:image", image)?;
        }
        let card = if meta.og_image.is_some() { "summary_large_image" } else { "summary" };
        meta_name(out, "twitter:card", card)?;
        meta_name(out, "twitter:title", &meta.og_title)?;
        if let Some(description) = &meta.og_description {
            meta_name(out, "twitter:description", description)?;
        }
        if let Some(image) = &meta.og_image {
            meta_name(out, "twitter:image", image)?;
        }
    }

    if let Some(favicon) = meta.favicon.as_deref().and_then(|f| safe_resource_url(f, true)) {
        writeln!(out, "<link rel=\"icon\" href=\"{}\">", escape_attribute(&favicon))?;
    }
    if !stylesheet.is_empty() {
        writeln!(out, "<style>\n{stylesheet}\n</style>")?;
    }
    for code in head_code {
        out.push_str(code);
        out.push('\n');
    }
    out.push_str("</head>\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn site() -> SiteSettings {
        SiteSettings {
            title: Some("Acme".to_string()),
            url: Some("https://acme.test/".to_string()),
            default_og_image: Some("/img/share.png".to_string()),
            ..SiteSettings::default()
        }
    }

    #[test]
    fn title_rules() {
        assert_eq!(document_title(Some(" Exact "), "About", Some("Acme")), "Exact");
        assert_eq!(document_title(None, "About", Some("Acme")), "About | Acme");
        assert_eq!(document_title(None, "Acme", Some("Acme")), "Acme");
        assert_eq!(document_title(None, "", Some("Acme")), "Acme");
        assert_eq!(document_title(None, "About", None), "About");
    }

    #[test]
    fn page_urls_map_homepage_to_root() {
        assert_eq!(page_url("https://a.test", "home", "home"), "https://a.test/");
        assert_eq!(page_url("https://a.test", "about", "home"), "https://a.test/about");
    }

    #[test]
    fn page_head_resolves_canonical_and_social_fallbacks() {
        let meta = HeadMeta::for_page("About", "about", &PageSettings::default(), &site());
        assert_eq!(meta.title, "About | Acme");
        assert_eq!(meta.canonical_url.as_deref(), Some("https://acme.test/about"));
        assert_eq!(meta.og_image.as_deref(), Some("https://acme.test/img/share.png"));
        assert_eq!(meta.robots.content(), "index, follow");

        let mut html = String::new();
        write_head(&mut html, &meta, "", &[]).unwrap();
        assert!(html.contains("<title>About | Acme</title>"));
        assert!(html.contains("<link rel=\"canonical\" href=\"https://acme.test/about\">"));
        assert!(html.contains("<meta property=\"og:url\" content=\"https://acme.test/about\">"));
        assert!(html.contains("<meta name=\"twitter:card\" content=\"summary_large_image\">"));
        assert!(!html.contains("<style>"));
    }

    #[test]
    fn unsafe_canonical_is_replaced_and_values_escaped() {
        let mut page = PageSettings::default();
        page.seo.canonical_url = Some("javascript:alert(1)".to_string());
        page.seo.title = Some("<b>\"Hi\"</b>".to_string());
        page.seo.no_index = true;
        let meta = HeadMeta::for_page("x", "x", &page, &site());
        assert_eq!(meta.canonical_url.as_deref(), Some("https://acme.test/x"));

        let mut html = String::new();
        write_head(&mut html, &meta, "a{}", &["<meta name=\"x\">".to_string()]).unwrap();
        assert!(html.contains("<title>&lt;b&gt;&quot;Hi&quot;&lt;/b&gt;</title>"));
        assert!(html.contains("content=\"noindex, follow\""));
        assert!(html.contains("<style>\na{}\n</style>\n<meta name=\"x\">\n</head>"));
    }

    #[test]
    fn not_found_head_is_noindex_without_social_tags() {
        let meta = HeadMeta::for_not_found(&site());
        let mut html = String::new();
        write_head(&mut html, &meta, "", &[]).unwrap();
        assert!(html.contains("<title>Page not found | Acme</title>"));
        assert!(html.contains("content=\"noindex, follow\""));
        assert!(!html.contains("og:"));
        assert!(!html.contains("canonical"));
    }
}

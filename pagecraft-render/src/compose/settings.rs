//! Settings and content records the composer consumes.

use crate::document::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_HOMEPAGE_SLUG: &str = "home";
pub const DEFAULT_LANGUAGE: &str = "en";

/// Site-wide settings, read from the flat key -> JSON settings map.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSettings {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub favicon: Option<String>,
    pub head_code: Option<String>,
    pub footer_code: Option<String>,
    pub homepage_slug: String,
    pub language: String,
    pub robots_txt: Option<String>,
    pub discourage_search_engines: bool,
    pub default_og_image: Option<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            url: None,
            favicon: None,
            head_code: None,
            footer_code: None,
            homepage_slug: DEFAULT_HOMEPAGE_SLUG.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            robots_txt: None,
            discourage_search_engines: false,
            default_og_image: None,
        }
    }
}

fn non_empty(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl SiteSettings {
    /// Unknown keys are ignored; wrongly-typed values count as absent.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        Self {
            title: non_empty(map, "siteTitle"),
            description: non_empty(map, "siteDescription"),
            url: non_empty(map, "siteUrl"),
            favicon: non_empty(map, "favicon"),
            head_code: non_empty(map, "headCode"),
            footer_code: non_empty(map, "footerCode"),
            homepage_slug: non_empty(map, "homepageSlug")
                .map(|s| s.trim_matches('/').to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.homepage_slug),
            language: non_empty(map, "language").unwrap_or(defaults.language),
            robots_txt: non_empty(map, "robotsTxt"),
            discourage_search_engines: map
                .get("discourageSearchEngines")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            default_og_image: non_empty(map, "defaultOgImage"),
        }
    }

    /// Site URL without trailing slashes.
    pub fn base_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .filter(|u| !u.is_empty())
    }
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Bool(b) => b,
        Value::String(s) => s == "true",
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

/// Keywords may be authored as one string or a list of strings.
fn lenient_keywords<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let joined = match Value::deserialize(d)? {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    };
    Ok(Some(joined).filter(|s| !s.is_empty()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoSettings {
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_keywords")]
    pub keywords: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub canonical_url: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub no_index: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub no_follow: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialSettings {
    #[serde(deserialize_with = "lenient_string")]
    pub og_title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub og_description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub og_image: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub twitter_card: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomCode {
    #[serde(deserialize_with = "lenient_string")]
    pub head: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub footer: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub css: Option<String>,
}

/// Per-page settings. Every section is optional and read independently, so one malformed
/// section never discards the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSettings {
    pub seo: SeoSettings,
    pub social: SocialSettings,
    pub custom_code: CustomCode,
    pub disable_header: bool,
    pub disable_footer: bool,
    pub custom_body_class: Option<String>,
}

fn section<T: for<'de> Deserialize<'de> + Default>(obj: &Map<String, Value>, key: &str) -> T {
    match obj.get(key) {
        Some(value @ Value::Object(_)) => serde_json::from_value(value.clone()).unwrap_or_else(|err| {
            tracing::debug!(section = key, error = %err, "unreadable page settings section");
            T::default()
        }),
        _ => T::default(),
    }
}

impl PageSettings {
    /// Read from the stored settings value, which may be an object or a JSON string.
    pub fn from_value(value: &Value) -> Self {
        let parsed;
        let value = match value {
            Value::String(raw) => {
                parsed = serde_json::from_str::<Value>(raw).unwrap_or(Value::Null);
                &parsed
            }
            other => other,
        };
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        Self {
            seo: section(obj, "seo"),
            social: section(obj, "social"),
            custom_code: section(obj, "customCode"),
            disable_header: obj.get("disableHeader").and_then(Value::as_bool).unwrap_or(false),
            disable_footer: obj.get("disableFooter").and_then(Value::as_bool).unwrap_or(false),
            custom_body_class: obj
                .get("customBodyClass")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Header,
    Footer,
    #[serde(rename = "notfound", alias = "not_found", alias = "404")]
    NotFound,
    Custom,
}

impl TemplateType {
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateType::Header => "header",
            TemplateType::Footer => "footer",
            TemplateType::NotFound => "notfound",
            TemplateType::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<TemplateType> {
        match s {
            "header" => Some(TemplateType::Header),
            "footer" => Some(TemplateType::Footer),
            "notfound" | "not_found" | "404" => Some(TemplateType::NotFound),
            "custom" => Some(TemplateType::Custom),
            _ => None,
        }
    }
}

/// An independently edited header, footer or not-found document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub template_type: TemplateType,
    #[serde(default)]
    pub content_json: Value,
    #[serde(default)]
    pub published: bool,
}

impl Template {
    pub fn document(&self) -> Document {
        Document::from_content(&self.content_json)
    }
}

/// The templates available to one request.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    pub fn by_id(&self, id: i64) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// The published template of a system type. Uniqueness is kept by the editor; should
    /// several exist, the lowest id wins.
    pub fn published_system(&self, kind: TemplateType) -> Option<&Template> {
        self.templates
            .iter()
            .filter(|t| t.published && t.template_type == kind)
            .min_by_key(|t| t.id)
    }

    /// A page's explicit template choice when it exists and is of `kind`, else the
    /// published system one.
    pub fn resolve(&self, page_choice: Option<i64>, kind: TemplateType) -> Option<&Template> {
        if let Some(id) = page_choice {
            match self.by_id(id) {
                Some(template) if template.template_type == kind => return Some(template),
                Some(template) => tracing::debug!(
                    template_id = id,
                    kind = kind.as_str(),
                    actual = template.template_type.as_str(),
                    "page template has the wrong type; using site default"
                ),
                None => tracing::debug!(template_id = id, kind = kind.as_str(), "page template missing; using site default"),
            }
        }
        self.published_system(kind)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// A page record as stored by the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageData {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub content_json: Value,
    pub header_template_id: Option<i64>,
    pub footer_template_id: Option<i64>,
    pub settings: Value,
    pub published: bool,
    pub is_template: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PageData {
    pub fn document(&self) -> Document {
        Document::from_content(&self.content_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn template(id: i64, kind: TemplateType, published: bool) -> Template {
        Template {
            id,
            name: format!("t{id}"),
            template_type: kind,
            content_json: Value::Null,
            published,
        }
    }

    #[test]
    fn site_settings_from_flat_map() {
        let map = json!({
            "siteTitle": "Acme",
            "siteUrl": "https://acme.test//",
            "homepageSlug": "/start/",
            "language": 5,
            "discourageSearchEngines": "yes",
            "unrelated": true
        });
        let settings = SiteSettings::from_map(map.as_object().unwrap());
        assert_eq!(settings.title.as_deref(), Some("Acme"));
        assert_eq!(settings.base_url(), Some("https://acme.test"));
        assert_eq!(settings.homepage_slug, "start");
        assert_eq!(settings.language, "en");
        assert!(!settings.discourage_search_engines);
        assert_eq!(SiteSettings::from_map(&Map::new()).homepage_slug, "home");
    }

    #[test]
    fn page_settings_are_read_per_section() {
        let settings = PageSettings::from_value(&json!({
            "seo": { "title": "T", "keywords": ["a", " b ", 3], "noIndex": "true" },
            "social": "broken",
            "customCode": { "css": "a{}", "head": 7 },
            "disableFooter": true,
            "customBodyClass": "  dark  "
        }));
        assert_eq!(settings.seo.title.as_deref(), Some("T"));
        assert_eq!(settings.seo.keywords.as_deref(), Some("a, b"));
        assert!(settings.seo.no_index);
        assert_eq!(settings.social, SocialSettings::default());
        assert_eq!(settings.custom_code.css.as_deref(), Some("a{}"));
        assert_eq!(settings.custom_code.head, None);
        assert!(settings.disable_footer);
        assert!(!settings.disable_header);
        assert_eq!(settings.custom_body_class.as_deref(), Some("dark"));

        let from_string = PageSettings::from_value(&json!("{\"disableHeader\":true}"));
        assert!(from_string.disable_header);
        assert_eq!(PageSettings::from_value(&json!(null)), PageSettings::default());
    }

    #[test]
    fn template_resolution_falls_back_to_system_template() {
        let catalog = TemplateCatalog::new(vec![
            template(7, TemplateType::Header, true),
            template(3, TemplateType::Header, true),
            template(4, TemplateType::Header, false),
            template(9, TemplateType::Footer, false),
        ]);
        assert_eq!(catalog.resolve(None, TemplateType::Header).map(|t| t.id), Some(3));
        assert_eq!(catalog.resolve(Some(4), TemplateType::Header).map(|t| t.id), Some(4));
        assert_eq!(catalog.resolve(Some(99), TemplateType::Header).map(|t| t.id), Some(3));
        assert_eq!(catalog.resolve(None, TemplateType::Footer).map(|t| t.id), None);
    }

    #[test]
    fn template_choice_of_the_wrong_type_is_ignored() {
        let catalog = TemplateCatalog::new(vec![
            template(3, TemplateType::Header, true),
            template(9, TemplateType::Footer, true),
        ]);
        assert_eq!(catalog.resolve(Some(9), TemplateType::Header).map(|t| t.id), Some(3));
        assert_eq!(catalog.resolve(Some(3), TemplateType::Footer).map(|t| t.id), Some(9));
        assert_eq!(catalog.resolve(Some(9), TemplateType::Footer).map(|t| t.id), Some(9));
    }

    #[test]
    fn template_type_wire_names() {
        let t: Template = serde_json::from_value(json!({
            "id": 1, "templateType": "notfound", "contentJson": {}, "published": true
        }))
        .unwrap();
        assert_eq!(t.template_type, TemplateType::NotFound);
        assert_eq!(TemplateType::parse("404"), Some(TemplateType::NotFound));
        assert_eq!(
            serde_json::to_value(TemplateType::NotFound).unwrap(),
            json!("notfound")
        );
    }
}

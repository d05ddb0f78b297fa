use axum::body::to_bytes;
use axum::http::{StatusCode, header};
use axum::response::Response;
use pagecraft_render::{PageData, SiteSettings, SitemapEntry, Template, TemplateType};
use pagecraft_server::{AppState, MemorySiteStore, SiteStore, StoreError, render_path};
use pretty_assertions::assert_eq;
use std::time::Duration;

const SITE: &str = r##"{
    "settings": {
        "siteTitle": "Acme",
        "siteUrl": "https://acme.test",
        "homepageSlug": "welcome"
    },
    "pages": [
        {
            "id": 1,
            "slug": "welcome",
            "title": "Welcome",
            "published": true,
            "updatedAt": "2024-05-01T10:00:00Z",
            "contentJson": {
                "ROOT": { "type": "Container", "nodes": ["h"] },
                "h": { "type": "Heading", "props": { "text": "Hello", "advancedStyling": { "color": "#123456" } } }
            }
        },
        {
            "id": 2,
            "slug": "about",
            "title": "About",
            "published": true,
            "headerTemplateId": 11,
            "contentJson": "{\"ROOT\":{\"type\":\"Text\",\"props\":{\"text\":\"About us\"}}}",
            "settings": { "seo": { "noIndex": true } }
        },
        {
            "id": 3,
            "slug": "broken",
            "title": "Broken",
            "published": true,
            "contentJson": "{{{"
        },
        { "id": 4, "slug": "draft", "title": "Draft", "published": false },
        {
            "id": 5,
            "slug": "mixed",
            "title": "Mixed",
            "published": true,
            "headerTemplateId": 12,
            "contentJson": {}
        }
    ],
    "templates": [
        {
            "id": 10,
            "templateType": "header",
            "published": true,
            "contentJson": { "ROOT": { "type": "Text", "props": { "text": "Main header" } } }
        },
        {
            "id": 11,
            "templateType": "header",
            "published": false,
            "contentJson": { "ROOT": { "type": "Text", "props": { "text": "About header" } } }
        },
        {
            "id": 12,
            "templateType": "footer",
            "published": false,
            "contentJson": { "ROOT": { "type": "Text", "props": { "text": "Stray footer" } } }
        }
    ]
}"##;

fn state() -> AppState<MemorySiteStore> {
    AppState::new(
        MemorySiteStore::from_json_str(SITE).unwrap(),
        Duration::from_secs(5),
    )
}

async fn body(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn content_type(response: &Response) -> String {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_root_serves_configured_homepage() {
    let response = render_path(&state(), "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/html; charset=utf-8");
    let html = body(response).await;
    assert!(html.contains("<h2 id=\"pc-h\">Hello</h2>"));
    assert!(html.contains("#pc-h { color: #123456; }"));
    assert!(html.contains("<link rel=\"canonical\" href=\"https://acme.test/\">"));
    assert!(html.contains("Main header"));
}

#[tokio::test]
async fn test_page_template_choice_beats_system_header() {
    let response = render_path(&state(), "/about/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body(response).await;
    assert!(html.contains("About header"));
    assert!(!html.contains("Main header"));
    assert!(html.contains("<title>About | Acme</title>"));
    assert!(html.contains("content=\"noindex, follow\""));
}

#[tokio::test]
async fn test_header_choice_of_footer_type_falls_back() {
    let response = render_path(&state(), "/mixed").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body(response).await;
    assert!(html.contains("Main header"));
    assert!(!html.contains("Stray footer"));
}

#[tokio::test]
async fn test_unknown_and_unpublished_paths_are_404() {
    for path in ["/draft", "/missing", "/a/b"] {
        let response = render_path(&state(), path).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        let html = body(response).await;
        assert!(html.contains("Page not found"), "{path}");
        assert!(html.contains("noindex"), "{path}");
    }
}

#[tokio::test]
async fn test_broken_document_still_renders() {
    let response = render_path(&state(), "/broken").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body(response).await.contains("<main class=\"pc-main\"></main>"));
}

#[tokio::test]
async fn test_robots_and_sitemap() {
    let response = render_path(&state(), "/robots.txt").await;
    assert_eq!(content_type(&response), "text/plain; charset=utf-8");
    assert_eq!(
        body(response).await,
        "User-agent: *\nAllow: /\n\nSitemap: https://acme.test/sitemap.xml\n"
    );

    let response = render_path(&state(), "/sitemap.xml").await;
    assert_eq!(content_type(&response), "application/xml");
    let xml = body(response).await;
    assert!(xml.contains("<loc>https://acme.test/</loc>"));
    assert!(xml.contains("<lastmod>2024-05-01</lastmod>"));
    assert!(xml.contains("<loc>https://acme.test/broken</loc>"));
    assert!(!xml.contains("about"));
    assert!(!xml.contains("draft"));
}

/// A store whose every read fails or stalls.
struct FailingStore {
    stall: bool,
}

impl FailingStore {
    async fn fail<T>(&self) -> Result<T, StoreError> {
        if self.stall {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Err(StoreError::Snapshot("unreachable".to_string()))
    }
}

impl SiteStore for FailingStore {
    async fn site_settings(&self) -> Result<SiteSettings, StoreError> {
        self.fail().await
    }

    async fn published_page(&self, _slug: &str) -> Result<Option<PageData>, StoreError> {
        self.fail().await
    }

    async fn templates_by_ids(&self, _ids: &[i64]) -> Result<Vec<Template>, StoreError> {
        self.fail().await
    }

    async fn published_system_template(&self, _kind: TemplateType) -> Result<Option<Template>, StoreError> {
        self.fail().await
    }

    async fn sitemap_pages(&self) -> Result<Vec<SitemapEntry>, StoreError> {
        self.fail().await
    }
}

#[tokio::test]
async fn test_store_failures_map_to_500_and_503() {
    let failing = AppState::new(FailingStore { stall: false }, Duration::from_secs(5));
    assert_eq!(
        render_path(&failing, "/").await.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );

    let stalled = AppState::new(FailingStore { stall: true }, Duration::from_millis(20));
    assert_eq!(
        render_path(&stalled, "/about").await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

/// What a public request path asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Slug(String),
    RobotsTxt,
    Sitemap,
    NotFound,
}

/// Classify a request path (query string already removed). Only single-segment slugs can
/// name a page; a trailing slash is tolerated.
pub fn classify_path(path: &str) -> Route {
    match path {
        "" | "/" => return Route::Home,
        "/robots.txt" => return Route::RobotsTxt,
        "/sitemap.xml" => return Route::Sitemap,
        _ => {}
    }
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() || trimmed.contains('/') {
        return Route::NotFound;
    }
    Route::Slug(trimmed.to_string())
}

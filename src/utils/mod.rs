//! Utility functions for the catalog engine
//!
//! - base URL sanitization for provider endpoints
//! - Text helpers for classification (`utils::text`)

pub mod text;

/// Sanitize a base URL by removing trailing slashes and ensuring proper format
pub fn sanitize_base_url(base_url: &str) -> String {
    let mut url = base_url.trim().to_string();

    while url.ends_with('/') {
        url.pop();
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        url = format!("http://{}", url);
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_base_url() {
        assert_eq!(
            sanitize_base_url("http://localhost:8080"),
            "http://localhost:8080"
        );
        assert_eq!(
            sanitize_base_url("http://localhost:8080//"),
            "http://localhost:8080"
        );
        assert_eq!(sanitize_base_url("localhost:8080"), "http://localhost:8080");
        assert_eq!(
            sanitize_base_url("https://example.com/"),
            "https://example.com"
        );
    }
}

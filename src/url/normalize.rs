use crate::UrlError;
use url::Url;

/// Path suffixes whose query string carries no page identity
const STATIC_EXTENSIONS: &[&str] = &[".html", ".htm", ".php", ".asp", ".aspx"];

/// Directory index documents that collapse to their containing directory
const INDEX_DOCUMENTS: &[&str] = &["/index.html", "/index.htm", "/index.php"];

/// Normalizes a URL into the canonical form used as its deduplication key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject schemes other than HTTP and HTTPS, and URLs without a host
/// 3. Lowercase the host and strip ports 80 and 443
/// 4. Remove the fragment
/// 5. Drop the query string when the path names a static page
///    (`.html`, `.htm`, `.php`, `.asp`, `.aspx`)
/// 6. Collapse trailing `index.html` / `index.htm` / `index.php` to the
///    containing directory
/// 7. Remove the trailing slash unless the path is the root
///
/// The result is a fixpoint: normalizing a normalized URL returns it unchanged.
///
/// # Examples
///
/// ```
/// use keyword_crawler::url::normalize_url;
///
/// let url = normalize_url("http://EXAMPLE.COM:80/docs/index.html?x=1#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/docs");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_lowercase(),
        _ => return Err(UrlError::MissingDomain),
    };
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;

    if matches!(url.port(), Some(80) | Some(443)) {
        url.set_port(None)
            .map_err(|_| UrlError::Malformed(format!("Cannot strip port from {}", url_str)))?;
    }

    url.set_fragment(None);

    let original_path = url.path().to_string();
    let path = normalize_path(&original_path);

    // Checking both paths keeps the result stable when a trailing slash hid the extension
    if is_static_page(&original_path) || is_static_page(&path) {
        url.set_query(None);
    }
    url.set_path(&path);

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}

fn is_static_page(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    STATIC_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Strips trailing slashes and index documents until nothing changes
fn normalize_path(path: &str) -> String {
    let mut current = path.to_string();

    loop {
        let trimmed = current.trim_end_matches('/');
        let lower = trimmed.to_ascii_lowercase();

        let parent = INDEX_DOCUMENTS
            .iter()
            .find_map(|index| lower.strip_suffix(index).map(|rest| rest.len()))
            .map(|len| trimmed[..len].to_string());

        match parent {
            Some(parent) => current = parent,
            None => {
                current = trimmed.to_string();
                break;
            }
        }
    }

    if current.is_empty() {
        "/".to_string()
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(url: &str) -> String {
        normalize_url(url).unwrap().to_string()
    }

    #[test]
    fn test_lowercase_host() {
        assert_eq!(key("https://EXAMPLE.COM/Page"), "https://example.com/Page");
    }

    #[test]
    fn test_strip_default_ports() {
        assert_eq!(key("http://example.com:80/a"), "http://example.com/a");
        assert_eq!(key("https://example.com:443/a"), "https://example.com/a");
        assert_eq!(key("http://example.com:443/a"), "http://example.com/a");
    }

    #[test]
    fn test_keep_other_ports() {
        assert_eq!(key("http://127.0.0.1:8080/a"), "http://127.0.0.1:8080/a");
    }

    #[test]
    fn test_remove_trailing_slash() {
        assert_eq!(key("https://example.com/page/"), "https://example.com/page");
    }

    #[test]
    fn test_keep_root_slash() {
        assert_eq!(key("https://example.com/"), "https://example.com/");
        assert_eq!(key("https://example.com"), "https://example.com/");
    }

    #[test]
    fn test_remove_fragment() {
        assert_eq!(key("https://example.com/page#section"), "https://example.com/page");
    }

    #[test]
    fn test_collapse_index_documents() {
        assert_eq!(key("https://example.com/index.html"), "https://example.com/");
        assert_eq!(key("https://example.com/docs/index.htm"), "https://example.com/docs");
        assert_eq!(key("https://example.com/a/index.php"), "https://example.com/a");
        assert_eq!(
            key("https://example.com/a/index.html/index.php"),
            "https://example.com/a"
        );
    }

    #[test]
    fn test_drop_query_for_static_pages() {
        assert_eq!(
            key("https://example.com/page.html?session=1"),
            "https://example.com/page.html"
        );
        assert_eq!(
            key("https://example.com/app.ASPX?id=4"),
            "https://example.com/app.ASPX"
        );
    }

    #[test]
    fn test_keep_query_for_dynamic_paths() {
        assert_eq!(
            key("https://example.com/search?q=rust"),
            "https://example.com/search?q=rust"
        );
    }

    #[test]
    fn test_empty_query_removed() {
        assert_eq!(key("https://example.com/page?"), "https://example.com/page");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "http://EXAMPLE.com:80/Docs/index.html?x=1#frag",
            "https://example.com/page.html/?q=1",
            "https://example.com/a/b/",
            "https://example.com/search?q=rust&page=2",
            "http://127.0.0.1:9000/index.php/",
            "https://example.com//",
        ];

        for input in inputs {
            let once = key(input);
            let twice = key(&once);
            assert_eq!(once, twice, "normalization not idempotent for {}", input);
        }
    }

    #[test]
    fn test_invalid_scheme() {
        assert!(matches!(
            normalize_url("ftp://example.com/page"),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(matches!(
            normalize_url("mailto:someone@example.com"),
            Err(UrlError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_malformed_url() {
        assert!(matches!(normalize_url("not a url"), Err(UrlError::Parse(_))));
    }
}

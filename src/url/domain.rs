use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use keyword_crawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Returns the key identifying a URL's site: the lowercase host, plus the port
/// when it is not 80 or 443
///
/// Domain filtering, robots.txt caching and rate limiting all key on this value,
/// so two servers on the same host but different ports are distinct sites.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use keyword_crawler::url::domain_key;
///
/// let url = Url::parse("http://127.0.0.1:3000/a").unwrap();
/// assert_eq!(domain_key(&url), Some("127.0.0.1:3000".to_string()));
///
/// let url = Url::parse("https://Example.com:443/").unwrap();
/// assert_eq!(domain_key(&url), Some("example.com".to_string()));
/// ```
pub fn domain_key(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    match url.port() {
        None | Some(80) | Some(443) => Some(host),
        Some(port) => Some(format!("{}:{}", host, port)),
    }
}

/// Parses a URL string and returns its domain key
pub fn domain_key_of(url_str: &str) -> Option<String> {
    Url::parse(url_str).ok().as_ref().and_then(domain_key)
}

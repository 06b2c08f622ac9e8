use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Reasons a catalog URL is refused.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("Private IP address not allowed: {0}")]
    PrivateIp(String),
    #[error("Localhost not allowed")]
    Localhost,
}

/// Validates a feed URL before it enters the source catalog.
///
/// Rejects non-HTTP(S) schemes, `localhost`, loopback and private/link-local
/// IP literals.
///
/// ```
/// use secfeed::util::validate_url;
///
/// assert!(validate_url("https://medium.com/feed/tag/osint").is_ok());
/// assert!(validate_url("http://192.168.1.1/feed").is_err());
/// assert!(validate_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if let Some(host) = url.host_str() {
        if host.eq_ignore_ascii_case("localhost") {
            return Err(UrlValidationError::Localhost);
        }

        let bare = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if let Ok(ip) = bare.parse::<IpAddr>() {
            if ip.is_loopback() {
                return Err(UrlValidationError::Localhost);
            }
            if is_internal(&ip) {
                return Err(UrlValidationError::PrivateIp(ip.to_string()));
            }
        }
    }

    Ok(url)
}

fn is_internal(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_link_local() || v4.is_unspecified(),
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            // fc00::/7 unique local, fe80::/10 link local
            v6.is_unspecified() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_feed_urls_accepted() {
        assert!(validate_url("https://medium.com/feed/tag/bug-bounty").is_ok());
        assert!(validate_url("http://news.example.org:8080/rss").is_ok());
    }

    #[test]
    fn test_non_http_schemes_rejected() {
        assert!(matches!(
            validate_url("ftp://example.com/feed"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_internal_hosts_rejected() {
        assert!(matches!(
            validate_url("http://localhost/feed"),
            Err(UrlValidationError::Localhost)
        ));
        assert!(matches!(
            validate_url("http://127.0.0.1/feed"),
            Err(UrlValidationError::Localhost)
        ));
        assert!(validate_url("http://10.0.0.1/feed").is_err());
        assert!(validate_url("http://169.254.1.1/feed").is_err());
        assert!(validate_url("http://[fe80::1]/feed").is_err());
        assert!(validate_url("http://0.0.0.0/feed").is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            validate_url("not a url"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }
}

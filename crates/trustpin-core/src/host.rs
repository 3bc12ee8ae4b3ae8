//! Hostname normalization for policy lookup.

/// Normalize a host string to its canonical lookup form.
///
/// Lowercases ASCII, strips a leading `http://`/`https://` scheme, drops
/// everything from the first `/` on, and trims surrounding whitespace. The
/// result is compared byte-exactly against policy domains, which are stored
/// lowercase. `*.`-prefixed policy domains are literal labels; there is no
/// wildcard matching.
pub fn normalize(host: &str) -> String {
    let lowered = host.trim().to_ascii_lowercase();

    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);

    without_scheme
        .split('/')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_scheme_and_path() {
        assert_eq!(
            normalize("HTTPS://API.example.COM/path?x=1"),
            "api.example.com"
        );
        assert_eq!(normalize("http://api.example.com"), "api.example.com");
        assert_eq!(normalize("api.example.com/v1/users"), "api.example.com");
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(normalize("  api.example.com  "), "api.example.com");
        assert_eq!(normalize("\thttps://API.example.com\n"), "api.example.com");
    }

    #[test]
    fn plain_hosts_pass_through() {
        assert_eq!(normalize("api.example.com"), "api.example.com");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn wildcard_labels_stay_literal() {
        assert_eq!(normalize("*.example.com"), "*.example.com");
    }

    #[test]
    fn scheme_is_only_stripped_once() {
        assert_eq!(normalize("https://https://x.com"), "https:");
    }
}

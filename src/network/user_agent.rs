//! Request header values

/// User agent identifying this crate, with an optional operator suffix
pub fn user_agent(suffix: Option<&str>) -> String {
    let base = format!("ddg-typeahead/{}", crate::VERSION);
    match suffix.map(str::trim) {
        Some(suffix) if !suffix.is_empty() => format!("{} {}", base, suffix),
        _ => base,
    }
}

/// Standard accept header for JSON requests
pub fn accept_json() -> &'static str {
    "application/json,text/javascript,*/*;q=0.01"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent() {
        let ua = user_agent(None);
        assert!(ua.starts_with("ddg-typeahead/"));
        assert_eq!(user_agent(Some("  ")), ua);
        assert_eq!(user_agent(Some("(+https://example.org)")), format!("{} (+https://example.org)", ua));
    }
}

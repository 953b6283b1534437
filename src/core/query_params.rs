use std::collections::HashMap;

/// Parse query parameters from a URI string
///
/// Handles URL decoding and returns a HashMap of parameter key-value pairs.
/// Multiple values for the same key are not supported (only the last is kept).
pub fn parse_query_params(uri: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    if let Some(query_start) = uri.find('?') {
        let query = &uri[query_start + 1..];
        for param in query.split('&').filter(|p| !p.is_empty()) {
            if let Some(eq_idx) = param.find('=') {
                let key = &param[..eq_idx];
                let encoded_value = &param[eq_idx + 1..];
                let decoded = urlencoding::decode(encoded_value)
                    .unwrap_or(std::borrow::Cow::Borrowed(encoded_value))
                    .to_string();
                params.insert(key.to_string(), decoded);
            } else {
                // Flag parameter without value
                params.insert(param.to_string(), String::new());
            }
        }
    }

    params
}

/// Get a string parameter, treating an empty value as absent
pub fn get_string(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params.get(key).filter(|s| !s.is_empty()).cloned()
}

/// Get a pagination offset. Missing, malformed or negative values read as 0.
pub fn get_offset(params: &HashMap<String, String>, key: &str) -> i64 {
    params
        .get(key)
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0)
        .max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_values() {
        let params = parse_query_params("/profile?u=j%C3%B6rg&start=20");
        assert_eq!(get_string(&params, "u").as_deref(), Some("jörg"));
        assert_eq!(get_offset(&params, "start"), 20);
    }

    #[test]
    fn offset_defaults_to_zero() {
        let params = parse_query_params("/home?start=abc&neg=-10");
        assert_eq!(get_offset(&params, "start"), 0);
        assert_eq!(get_offset(&params, "neg"), 0);
        assert_eq!(get_offset(&params, "missing"), 0);
    }

    #[test]
    fn no_query_string() {
        assert!(parse_query_params("/timeline").is_empty());
        let params = parse_query_params("/profile?u=");
        assert_eq!(get_string(&params, "u"), None);
    }
}

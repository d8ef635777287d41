//! Query string and cookie parsing module
//!
//! Hand-rolled `application/x-www-form-urlencoded` and `Cookie` header
//! parsing. Malformed escapes are kept verbatim rather than rejected; a
//! query string is user input, not a place to fail a request.

/// Decode percent escapes, mapping invalid sequences through unchanged
pub fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' {
            let hex = bytes.get(index + 1..index + 3);
            if let Some(decoded) = hex.and_then(decode_hex_pair) {
                out.push(decoded);
                index += 3;
                continue;
            }
        }
        out.push(bytes[index]);
        index += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn decode_hex_pair(pair: &[u8]) -> Option<u8> {
    let hi = char::from(*pair.first()?).to_digit(16)?;
    let lo = char::from(*pair.get(1)?).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// Parse a query string into decoded name/value pairs, order preserved
///
/// `+` decodes to a space; a key without `=` gets an empty value.
pub fn parse_query(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            (
                percent_decode(&key.replace('+', " ")),
                percent_decode(&value.replace('+', " ")),
            )
        })
        .collect()
}

/// Parse a `Cookie` header into name/value pairs
pub fn parse_cookies(header: Option<&str>) -> Vec<(String, String)> {
    let Some(header) = header else {
        return Vec::new();
    };
    header
        .split(';')
        .filter_map(|part| {
            let (name, value) = part.trim().split_once('=')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// First value for a name, if any
pub fn first<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("a%20b"), "a b");
        assert_eq!(percent_decode("%2Fhome%2Fuser"), "/home/user");
        assert_eq!(percent_decode("plain"), "plain");
        // Malformed escapes pass through
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }

    #[test]
    fn test_parse_query_pairs() {
        let pairs = parse_query("start=0&end=10&q=fixed+query");
        assert_eq!(pairs.len(), 3);
        assert_eq!(first(&pairs, "start"), Some("0"));
        assert_eq!(first(&pairs, "q"), Some("fixed query"));
        assert_eq!(first(&pairs, "missing"), None);
    }

    #[test]
    fn test_parse_query_edge_cases() {
        assert!(parse_query("").is_empty());
        let pairs = parse_query("flag&x=1");
        assert_eq!(first(&pairs, "flag"), Some(""));
        // First occurrence wins on duplicates
        let pairs = parse_query("a=1&a=2");
        assert_eq!(first(&pairs, "a"), Some("1"));
    }

    #[test]
    fn test_parse_cookies() {
        let pairs = parse_cookies(Some("ads_id=abc123; theme=dark"));
        assert_eq!(first(&pairs, "ads_id"), Some("abc123"));
        assert_eq!(first(&pairs, "theme"), Some("dark"));
        assert!(parse_cookies(None).is_empty());
    }
}

//! Raw key string handling: masking, encoding detection and splitting.

use serde_json::Value;

use crate::model::KeyType;

const MASK: &str = "***";
const VISIBLE_PREFIX: usize = 3;
const VISIBLE_SUFFIX: usize = 4;

/// Mask a key, keeping the first three and last four characters.
///
/// Keys of seven characters or fewer are fully masked.
#[must_use]
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= VISIBLE_PREFIX + VISIBLE_SUFFIX {
        return MASK.to_string();
    }
    let prefix: String = chars[..VISIBLE_PREFIX].iter().collect();
    let suffix: String = chars[chars.len() - VISIBLE_SUFFIX..].iter().collect();
    format!("{prefix}{MASK}{suffix}")
}

/// Detect how a raw key string is encoded.
#[must_use]
pub fn detect_key_type(raw: &str) -> KeyType {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return KeyType::Single;
    }
    if (trimmed.starts_with('[') || trimmed.starts_with('{'))
        && serde_json::from_str::<Value>(trimmed).is_ok()
    {
        return KeyType::MultiJson;
    }
    if raw.contains('\n') {
        return KeyType::MultiLine;
    }
    KeyType::Single
}

/// Split a raw key string into individual keys.
///
/// JSON arrays yield one key per element: string elements keep their text,
/// other elements keep their compact JSON encoding. Every element is kept,
/// blank ones included, so positions match the per-key status indices. A JSON
/// object is a single credential. Anything else is split on newlines with
/// blank lines dropped.
#[must_use]
pub fn parse_keys(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.starts_with('[') {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
            return items
                .into_iter()
                .map(|item| match item {
                    Value::String(text) => text,
                    other => other.to_string(),
                })
                .collect();
        }
    }
    if trimmed.starts_with('{') {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
            return vec![value.to_string()];
        }
    }
    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_keeps_prefix_and_suffix() {
        assert_eq!(mask_key("sk-abcdefghwxyz"), "sk-***wxyz");
        assert_eq!(mask_key("12345678"), "123***5678");
    }

    #[test]
    fn short_keys_mask_completely() {
        assert_eq!(mask_key(""), "***");
        assert_eq!(mask_key("abc"), "***");
        assert_eq!(mask_key("1234567"), "***");
    }

    #[test]
    fn mask_respects_multibyte_characters() {
        assert_eq!(mask_key("ключ-секретный"), "клю***тный");
    }

    #[test]
    fn detects_key_encodings() {
        assert_eq!(detect_key_type(""), KeyType::Single);
        assert_eq!(detect_key_type("sk-one"), KeyType::Single);
        assert_eq!(detect_key_type("sk-one\nsk-two"), KeyType::MultiLine);
        assert_eq!(detect_key_type(r#"["a","b"]"#), KeyType::MultiJson);
        assert_eq!(detect_key_type(r#"{"type":"service_account"}"#), KeyType::MultiJson);
        assert_eq!(detect_key_type("[not json\nsecond"), KeyType::MultiLine);
    }

    #[test]
    fn parses_newline_separated_keys() {
        assert_eq!(
            parse_keys("\n key1 \n\nkey2\r\nkey3\n"),
            vec!["key1", "key2", "key3"]
        );
        assert!(parse_keys("   ").is_empty());
    }

    #[test]
    fn parses_json_arrays() {
        assert_eq!(parse_keys(r#"["key1", "key2"]"#), vec!["key1", "key2"]);
        assert_eq!(
            parse_keys(r#"[{"project":"a"}, "key2", ""]"#),
            vec![
                r#"{"project":"a"}"#.to_string(),
                "key2".to_string(),
                String::new()
            ]
        );
    }

    #[test]
    fn blank_array_elements_keep_their_position() {
        let keys = parse_keys(r#"["key1", "", "key3"]"#);
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[2], "key3");
    }

    #[test]
    fn json_object_is_one_credential() {
        let raw = "{\n  \"type\": \"service_account\",\n  \"id\": 1\n}";
        let keys = parse_keys(raw);
        assert_eq!(keys.len(), 1);
        assert!(keys[0].contains("service_account"));
    }
}

//! Utility functions for code generation.

use gesso_carton::is_simple_identifier;

/// Quote `s` as a JavaScript string literal.
pub fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // Valid in JSON, but line terminators in older JavaScript
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Static object key: bare when it is an identifier, quoted otherwise.
pub fn property_key(name: &str) -> String {
    if is_simple_identifier(name) {
        name.to_string()
    } else {
        js_string(name)
    }
}

/// Body of a template literal chunk.
pub fn escape_template_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '`' => out.push_str("\\`"),
            '\\' => out.push_str("\\\\"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string() {
        assert_eq!(js_string("hello"), "\"hello\"");
        assert_eq!(js_string("a \"b\"\n"), "\"a \\\"b\\\"\\n\"");
        assert_eq!(js_string("\u{1}"), "\"\\u0001\"");
    }

    #[test]
    fn test_property_key() {
        assert_eq!(property_key("id"), "id");
        assert_eq!(property_key("data-id"), "\"data-id\"");
        assert_eq!(property_key("onUpdate:modelValue"), "\"onUpdate:modelValue\"");
    }

    #[test]
    fn test_template_literal() {
        assert_eq!(escape_template_literal("a`${b}"), "a\\`\\${b}");
    }
}

//! General-purpose string helpers and static name tables.

use crate::String;
use smallvec::SmallVec;

/// Convert kebab-case to camelCase (`foo-bar` → `fooBar`).
pub fn camelize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;
    for c in s.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    if upper_next {
        out.push('-');
    }
    out
}

/// Uppercase the first character.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(s.len());
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::default(),
    }
}

/// Convert camelCase to kebab-case (`fooBar` → `foo-bar`).
pub fn hyphenate(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Event name to handler prop key (`click` → `onClick`, `update:value` → `onUpdate:value`).
pub fn to_handler_key(event: &str) -> String {
    if event.is_empty() {
        return String::default();
    }
    let mut key = String::from("on");
    key.push_str(&capitalize(&camelize(event)));
    key
}

/// Whether a prop key names an event listener (`onClick`, `onUpdate:x`).
pub fn is_on(key: &str) -> bool {
    let bytes = key.as_bytes();
    bytes.len() > 2 && bytes[0] == b'o' && bytes[1] == b'n' && !bytes[2].is_ascii_lowercase()
}

static RESERVED_PROPS: phf::Set<&'static str> = phf::phf_set! {
    "", "key", "ref", "ref_for", "ref_key",
    "onVnodeBeforeMount", "onVnodeMounted", "onVnodeBeforeUpdate",
    "onVnodeUpdated", "onVnodeBeforeUnmount", "onVnodeUnmounted",
};

/// Props the runtime handles itself and that never count as dynamic props.
pub fn is_reserved_prop(name: &str) -> bool {
    RESERVED_PROPS.contains(name)
}

/// `[A-Za-z_$][\w$]*`
pub fn is_simple_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Whether an expression is a (possibly computed) member access path,
/// e.g. `foo`, `foo.bar`, `foo[bar].baz`, `foo?.bar`.
pub fn is_member_expression(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return false;
    }
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut expect_ident = true;
    while i < bytes.len() {
        let b = bytes[i];
        if expect_ident {
            let start = i;
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$')
            {
                i += 1;
            }
            if i == start || bytes[start].is_ascii_digit() {
                return false;
            }
            expect_ident = false;
            continue;
        }
        match b {
            b' ' | b'\t' | b'\n' | b'\r' => i += 1,
            b'.' => {
                expect_ident = true;
                i += 1;
            }
            b'?' if bytes.get(i + 1) == Some(&b'.') => {
                expect_ident = bytes.get(i + 2) != Some(&b'[');
                i += 2;
            }
            b'[' => {
                let mut depth = 0usize;
                while i < bytes.len() {
                    match bytes[i] {
                        b'[' => depth += 1,
                        b']' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                if depth != 0 {
                    return false;
                }
                i += 1;
            }
            _ => return false,
        }
    }
    !expect_ident
}

/// Whether an expression is a function literal (arrow or `function`).
pub fn is_fn_expression(s: &str) -> bool {
    let s = s.trim_start();
    let s = s.strip_prefix("async").map(str::trim_start).unwrap_or(s);
    if let Some(rest) = s.strip_prefix("function") {
        return rest.starts_with(|c: char| c == '(' || c.is_whitespace());
    }
    let head = if s.starts_with('(') {
        let mut depth = 0usize;
        let mut end = None;
        for (i, c) in s.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(i + 1);
                        break;
                    }
                }
                _ => {}
            }
        }
        match end {
            Some(end) => &s[end..],
            None => return false,
        }
    } else {
        let ident_end = s
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(s.len());
        if ident_end == 0 {
            return false;
        }
        &s[ident_end..]
    };
    head.trim_start().starts_with("=>")
}

/// Turn an asset name into a valid identifier (`my-comp` → `_component_my_comp`).
pub fn to_valid_asset_id(name: &str, kind: &str) -> String {
    let mut id = String::from("_");
    id.push_str(kind);
    id.push('_');
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            id.push(c);
        } else if c == '-' {
            id.push('_');
        } else {
            id.push_str(&(c as u32).to_string());
        }
    }
    id
}

/// Names bound by a parameter pattern such as `item`, `{ id, name: label }`
/// or `[first, ...rest]`. Default values are skipped.
pub fn pattern_identifiers(pattern: &str) -> SmallVec<[String; 4]> {
    let bytes = pattern.as_bytes();
    let mut names = SmallVec::new();
    let mut depth = 0usize;
    let mut default_depth: Option<usize> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'{' | b'[' | b'(' => depth += 1,
            b'}' | b']' | b')' => {
                if default_depth == Some(depth) {
                    default_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            b',' if default_depth == Some(depth) => default_depth = None,
            b'=' if bytes.get(i + 1) != Some(&b'>') && default_depth.is_none() => {
                default_depth = Some(depth);
            }
            b'\'' | b'"' | b'`' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            _ if b.is_ascii_alphabetic() || b == b'_' || b == b'$' => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$')
                {
                    i += 1;
                }
                let ident = &pattern[start..i];
                let mut j = i;
                while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                let is_key = bytes.get(j) == Some(&b':');
                if default_depth.is_none() && !is_key && !is_js_keyword(ident) {
                    names.push(String::from(ident));
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    names
}

static BUILTIN_DIRECTIVES: phf::Set<&'static str> = phf::phf_set! {
    "bind", "cloak", "else-if", "else", "for", "html", "if", "model",
    "on", "once", "pre", "show", "slot", "text", "memo", "is",
};

/// Directives handled by the compiler or runtime without `resolveDirective`.
pub fn is_builtin_directive(name: &str) -> bool {
    BUILTIN_DIRECTIVES.contains(name)
}

static GLOBALLY_ALLOWED: phf::Set<&'static str> = phf::phf_set! {
    "Infinity", "undefined", "NaN", "isFinite", "isNaN", "parseFloat",
    "parseInt", "decodeURI", "decodeURIComponent", "encodeURI",
    "encodeURIComponent", "Math", "Number", "Date", "Array", "Object",
    "Boolean", "String", "RegExp", "Map", "Set", "JSON", "Intl", "BigInt",
    "console", "Error", "Symbol",
};

/// JS globals a template may read without going through the render context.
pub fn is_globally_allowed(name: &str) -> bool {
    GLOBALLY_ALLOWED.contains(name)
}

static LITERAL_KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "true", "false", "null", "this",
};

/// Keywords that evaluate to a value on their own.
pub fn is_literal_keyword(name: &str) -> bool {
    LITERAL_KEYWORDS.contains(name)
}

static JS_KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "await", "break", "case", "catch", "class", "const", "continue",
    "debugger", "default", "delete", "do", "else", "export", "extends",
    "finally", "for", "function", "if", "import", "in", "instanceof", "let",
    "new", "of", "return", "super", "switch", "throw", "try", "typeof",
    "var", "void", "while", "with", "yield", "async",
};

/// Reserved words that are never identifiers.
pub fn is_js_keyword(name: &str) -> bool {
    JS_KEYWORDS.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("foo-bar"), "fooBar");
        assert_eq!(camelize("foo-bar-baz"), "fooBarBaz");
        assert_eq!(camelize("foo"), "foo");
    }

    #[test]
    fn test_hyphenate() {
        assert_eq!(hyphenate("fooBar"), "foo-bar");
        assert_eq!(hyphenate("MyComp"), "my-comp");
    }

    #[test]
    fn test_to_handler_key() {
        assert_eq!(to_handler_key("click"), "onClick");
        assert_eq!(to_handler_key("update:modelValue"), "onUpdate:modelValue");
        assert_eq!(to_handler_key("my-event"), "onMyEvent");
    }

    #[test]
    fn test_is_on() {
        assert!(is_on("onClick"));
        assert!(is_on("onUpdate:x"));
        assert!(!is_on("once"));
        assert!(!is_on("on"));
    }

    #[test]
    fn test_member_expression() {
        assert!(is_member_expression("foo"));
        assert!(is_member_expression("foo.bar"));
        assert!(is_member_expression("foo[bar].baz"));
        assert!(is_member_expression("foo?.bar"));
        assert!(!is_member_expression("foo()"));
        assert!(!is_member_expression("a + b"));
        assert!(!is_member_expression("1foo"));
        assert!(!is_member_expression("foo."));
    }

    #[test]
    fn test_fn_expression() {
        assert!(is_fn_expression("() => foo()"));
        assert!(is_fn_expression("e => foo(e)"));
        assert!(is_fn_expression("async (a, b) => a"));
        assert!(is_fn_expression("function (e) { foo(e) }"));
        assert!(!is_fn_expression("foo($event)"));
        assert!(!is_fn_expression("count++"));
    }

    #[test]
    fn test_asset_id() {
        assert_eq!(to_valid_asset_id("my-comp", "component"), "_component_my_comp");
        assert_eq!(to_valid_asset_id("Foo", "component"), "_component_Foo");
        assert_eq!(to_valid_asset_id("focus", "directive"), "_directive_focus");
    }

    #[test]
    fn test_pattern_identifiers() {
        assert_eq!(pattern_identifiers("item").as_slice(), ["item"]);
        assert_eq!(
            pattern_identifiers("{ id, name: label }").as_slice(),
            ["id", "label"]
        );
        assert_eq!(
            pattern_identifiers("[first, ...rest]").as_slice(),
            ["first", "rest"]
        );
        assert_eq!(
            pattern_identifiers("{ a = fallback.value, b }").as_slice(),
            ["a", "b"]
        );
    }

    #[test]
    fn test_tables() {
        assert!(is_builtin_directive("model"));
        assert!(!is_builtin_directive("focus"));
        assert!(is_globally_allowed("Math"));
        assert!(!is_globally_allowed("window"));
        assert!(is_js_keyword("typeof"));
        assert!(is_literal_keyword("true"));
    }
}

//! `v-for` expression parsing: `(value, key, index) in source`.

use gesso_carton::{Box, Bump};
use gesso_relief::ast::{ExpressionNode, ForParseResult, Position, SimpleExpressionNode, SourceLocation};

/// Split a `v-for` expression into its source and alias expressions.
///
/// Returns `None` when the expression has no `in`/`of` separator or an empty
/// source. Alias spans point into the directive value.
pub fn parse_for_expression<'a>(
    allocator: &'a Bump,
    exp: &SimpleExpressionNode<'_>,
) -> Option<ForParseResult<'a>> {
    let content = exp.content.as_str();
    let (lhs_end, rhs_start) = find_separator(content)?;

    let rhs = &content[rhs_start..];
    let rhs_lead = rhs.len() - rhs.trim_start().len();
    let source_text = rhs.trim();
    if source_text.is_empty() {
        return None;
    }
    let source = make_expression(allocator, exp, content, rhs_start + rhs_lead, source_text);

    let lhs = &content[..lhs_end];
    let lhs_lead = lhs.len() - lhs.trim_start().len();
    let mut alias_text = lhs.trim();
    let mut alias_offset = lhs_lead;
    if alias_text.starts_with('(') && alias_text.ends_with(')') && alias_text.len() >= 2 {
        alias_text = &alias_text[1..alias_text.len() - 1];
        alias_offset += 1;
    }

    let mut aliases: [Option<ExpressionNode<'a>>; 3] = [None, None, None];
    for (slot, (start, part)) in split_top_level(alias_text).into_iter().take(3).enumerate() {
        let lead = part.len() - part.trim_start().len();
        let text = part.trim();
        if text.is_empty() {
            continue;
        }
        aliases[slot] = Some(make_expression(
            allocator,
            exp,
            content,
            alias_offset + start + lead,
            text,
        ));
    }
    let [value, key, index] = aliases;

    Some(ForParseResult {
        source,
        value,
        key,
        index,
        finalized: false,
    })
}

/// Byte range around the first top-level ` in ` / ` of `.
fn find_separator(content: &str) -> Option<(usize, usize)> {
    let bytes = content.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b if depth == 0 && b.is_ascii_whitespace() => {
                let word_start = i + 1;
                let rest = &bytes[word_start..];
                let is_keyword = (rest.starts_with(b"in") || rest.starts_with(b"of"))
                    && rest.get(2).is_some_and(|c| c.is_ascii_whitespace());
                if is_keyword {
                    return Some((i, word_start + 2));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split on commas outside brackets, keeping each part's offset.
fn split_top_level(text: &str) -> std::vec::Vec<(usize, &str)> {
    let mut parts = std::vec::Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, b) in text.bytes().enumerate() {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                parts.push((start, &text[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push((start, &text[start..]));
    parts
}

fn make_expression<'a>(
    allocator: &'a Bump,
    exp: &SimpleExpressionNode<'_>,
    content: &str,
    offset: usize,
    text: &str,
) -> ExpressionNode<'a> {
    let loc = if exp.loc.is_stub() {
        SourceLocation::STUB
    } else {
        let start = advance(exp.loc.start, &content[..offset]);
        let end = advance(start, text);
        SourceLocation::new(start, end, text)
    };
    ExpressionNode::Simple(Box::new_in(
        SimpleExpressionNode::new(text, false, loc),
        allocator,
    ))
}

/// Position reached after reading `text` from `pos`.
pub(crate) fn advance(mut pos: Position, text: &str) -> Position {
    for c in text.chars() {
        pos.offset += c.len_utf8() as u32;
        if c == '\n' {
            pos.line += 1;
            pos.column = 1;
        } else {
            pos.column += 1;
        }
    }
    pos
}

//! Template parser.
//!
//! A single forward pass over the source bytes. Open elements are kept on a
//! stack and attached to their parent when closed, so mismatched or missing
//! end tags recover the way browsers do and leave a diagnostic behind.

use gesso_carton::{Box, Bump, String, Vec};
use gesso_relief::ast::*;
use gesso_relief::errors::{CompilerError, ErrorCode};
use gesso_relief::options::{ParserOptions, WhitespaceStrategy};
use memchr::{memchr, memchr2, memmem};

use crate::for_expression::parse_for_expression;

/// Parser state
pub struct Parser<'a> {
    /// Arena allocator
    allocator: &'a Bump,
    /// Source code
    source: &'a str,
    /// Parser options
    options: ParserOptions,
    /// Open elements, innermost last
    stack: Vec<'a, StackEntry<'a>>,
    /// Root node
    root: RootNode<'a>,
    /// Errors collected during parsing
    errors: Vec<'a, CompilerError>,
    /// Newline offsets for calculating line/column
    newlines: Vec<'a, usize>,
    /// Current byte offset
    pos: usize,
    /// Whether in pre block
    in_pre: bool,
    /// Whether in v-pre block
    in_v_pre: bool,
}

/// Open element awaiting its end tag
#[derive(Debug)]
struct StackEntry<'a> {
    element: ElementNode<'a>,
    start: usize,
    in_pre: bool,
    in_v_pre: bool,
}

/// Attribute as written, before it becomes an attribute or a directive
struct RawAttribute {
    name_start: usize,
    name_end: usize,
    value: Option<(usize, usize)>,
    end: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser
    pub fn new(allocator: &'a Bump, source: &'a str) -> Self {
        Self::with_options(allocator, source, ParserOptions::default())
    }

    /// Create a new parser with options
    pub fn with_options(allocator: &'a Bump, source: &'a str, options: ParserOptions) -> Self {
        let newlines = Vec::from_iter_in(memchr::memchr_iter(b'\n', source.as_bytes()), allocator);
        Self {
            allocator,
            source,
            options,
            stack: Vec::new_in(allocator),
            root: RootNode::new(allocator, source),
            errors: Vec::new_in(allocator),
            newlines,
            pos: 0,
            in_pre: false,
            in_v_pre: false,
        }
    }

    /// Parse the source and return the AST
    pub fn parse(mut self) -> (RootNode<'a>, Vec<'a, CompilerError>) {
        let source = self.source;
        let bytes = source.as_bytes();
        while self.pos < bytes.len() {
            let rest = &bytes[self.pos..];
            if rest.starts_with(b"<!--") {
                self.parse_comment();
            } else if rest.starts_with(b"</") {
                self.parse_close_tag();
            } else if rest.starts_with(b"<!") || rest.starts_with(b"<?") {
                self.parse_bogus_comment();
            } else if rest[0] == b'<' && rest.get(1).is_some_and(u8::is_ascii_alphabetic) {
                self.parse_open_tag();
            } else if !self.in_v_pre && rest.starts_with(self.options.delimiters.0.as_bytes()) {
                self.parse_interpolation();
            } else {
                self.parse_text();
            }
        }

        self.handle_unclosed_elements();

        if self.options.whitespace == WhitespaceStrategy::Condense {
            condense_whitespace(&mut self.root.children, self.options.is_pre_tag);
        }
        self.root.loc = self.create_loc(0, self.source.len());

        tracing::debug!(
            children = self.root.children.len(),
            errors = self.errors.len(),
            "parsed template"
        );
        (self.root, self.errors)
    }

    /// Calculate position from byte offset
    fn get_pos(&self, offset: usize) -> Position {
        let line = match self.newlines.binary_search(&offset) {
            Ok(i) | Err(i) => i + 1,
        };
        let column = if line == 1 {
            offset + 1
        } else {
            offset - self.newlines[line - 2]
        };
        Position::new(offset as u32, line as u32, column as u32)
    }

    /// Create a source location
    fn create_loc(&self, start: usize, end: usize) -> SourceLocation {
        SourceLocation::new(self.get_pos(start), self.get_pos(end), &self.source[start..end])
    }

    fn error(&mut self, code: ErrorCode, start: usize, end: usize) {
        let end = end.min(self.source.len()).max(start);
        let loc = self.create_loc(start, end);
        self.errors.push(CompilerError::new(code, Some(loc)));
    }

    /// Add child to current context (stack top or root)
    fn add_child(&mut self, child: TemplateChildNode<'a>) {
        match self.stack.last_mut() {
            Some(entry) => entry.element.children.push(child),
            None => self.root.children.push(child),
        }
    }

    fn handle_unclosed_elements(&mut self) {
        while let Some(entry) = self.stack.pop() {
            let start = entry.element.loc.start.offset as usize;
            let end = entry.element.loc.end.offset as usize;
            self.error(ErrorCode::MissingEndTag, start, end);
            self.close_element(entry, self.source.len());
        }
    }

    fn close_element(&mut self, mut entry: StackEntry<'a>, end: usize) {
        entry.element.loc = self.create_loc(entry.start, end);
        self.in_pre = entry.in_pre;
        self.in_v_pre = entry.in_v_pre;
        let boxed = Box::new_in(entry.element, self.allocator);
        self.add_child(TemplateChildNode::Element(boxed));
    }

    // ========== Text ==========

    fn parse_text(&mut self) {
        let source = self.source;
        let bytes = source.as_bytes();
        let start = self.pos;
        let open = self.options.delimiters.0.clone();
        let open = open.as_bytes();
        let mut i = start;
        let end = loop {
            let next = if self.in_v_pre {
                memchr(b'<', &bytes[i..])
            } else {
                memchr2(b'<', open[0], &bytes[i..])
            };
            let Some(offset) = next else {
                break bytes.len();
            };
            let j = i + offset;
            if bytes[j] == b'<' {
                match bytes.get(j + 1) {
                    Some(c) if c.is_ascii_alphabetic() || matches!(c, b'/' | b'!' | b'?') => {
                        if j > start {
                            break j;
                        }
                    }
                    Some(_) => self.error(ErrorCode::InvalidFirstCharacterOfTagName, j, j + 1),
                    None => self.error(ErrorCode::EofBeforeTagName, j, j + 1),
                }
            } else if bytes[j..].starts_with(open) && j > start {
                break j;
            }
            i = j + 1;
        };

        self.pos = end;
        let loc = self.create_loc(start, end);
        let text = TextNode::new(&source[start..end], loc);
        self.add_child(TemplateChildNode::Text(Box::new_in(text, self.allocator)));
    }

    fn parse_interpolation(&mut self) {
        let source = self.source;
        let bytes = source.as_bytes();
        let start = self.pos;
        let open_len = self.options.delimiters.0.len();
        let close = self.options.delimiters.1.clone();
        let close = close.as_bytes();
        let inner_start = start + open_len;

        let Some(found) = memmem::find(&bytes[inner_start..], close) else {
            self.error(ErrorCode::MissingInterpolationEnd, start, inner_start);
            let loc = self.create_loc(start, bytes.len());
            let text = TextNode::new(&source[start..], loc);
            self.add_child(TemplateChildNode::Text(Box::new_in(text, self.allocator)));
            self.pos = bytes.len();
            return;
        };
        let inner_end = inner_start + found;
        let end = inner_end + close.len();

        let raw = &source[inner_start..inner_end];
        let content = raw.trim();
        let trimmed_start = inner_start + (raw.len() - raw.trim_start().len());
        let inner_loc = self.create_loc(trimmed_start, trimmed_start + content.len());

        let expr = SimpleExpressionNode::new(content, false, inner_loc);
        let interp = InterpolationNode {
            content: ExpressionNode::Simple(Box::new_in(expr, self.allocator)),
            loc: self.create_loc(start, end),
        };
        self.add_child(TemplateChildNode::Interpolation(Box::new_in(
            interp,
            self.allocator,
        )));
        self.pos = end;
    }

    // ========== Comments ==========

    fn parse_comment(&mut self) {
        let source = self.source;
        let bytes = source.as_bytes();
        let start = self.pos;
        let inner_start = start + 4;

        let (inner_end, end) = if bytes[inner_start..].starts_with(b">") {
            self.error(ErrorCode::AbruptClosingOfEmptyComment, start, inner_start + 1);
            (inner_start, inner_start + 1)
        } else if bytes[inner_start..].starts_with(b"->") {
            self.error(ErrorCode::AbruptClosingOfEmptyComment, start, inner_start + 2);
            (inner_start, inner_start + 2)
        } else if let Some(found) = memmem::find(&bytes[inner_start..], b"-->") {
            (inner_start + found, inner_start + found + 3)
        } else if let Some(found) = memmem::find(&bytes[inner_start..], b"--!>") {
            self.error(ErrorCode::IncorrectlyClosedComment, inner_start + found, inner_start + found + 4);
            (inner_start + found, inner_start + found + 4)
        } else {
            self.error(ErrorCode::EofInComment, start, bytes.len());
            (bytes.len(), bytes.len())
        };

        self.pos = end;
        if self.options.comments || self.in_pre {
            let comment = CommentNode::new(&source[inner_start..inner_end], self.create_loc(start, end));
            self.add_child(TemplateChildNode::Comment(Box::new_in(comment, self.allocator)));
        }
    }

    /// `<!DOCTYPE ...>` and `<?...>` become comments
    fn parse_bogus_comment(&mut self) {
        let source = self.source;
        let bytes = source.as_bytes();
        let start = self.pos;
        let inner_start = start + 2;
        let (inner_end, end) = match memchr(b'>', &bytes[inner_start..]) {
            Some(found) => (inner_start + found, inner_start + found + 1),
            None => (bytes.len(), bytes.len()),
        };
        self.pos = end;
        if self.options.comments {
            let comment = CommentNode::new(&source[inner_start..inner_end], self.create_loc(start, end));
            self.add_child(TemplateChildNode::Comment(Box::new_in(comment, self.allocator)));
        }
    }

    // ========== Tags ==========

    fn parse_open_tag(&mut self) {
        let source = self.source;
        let bytes = source.as_bytes();
        let start = self.pos;
        let name_start = start + 1;
        let mut i = name_start;
        while i < bytes.len() && !is_end_of_tag_section(bytes[i]) {
            i += 1;
        }
        let tag = &source[name_start..i];

        let mut attributes = std::vec::Vec::new();
        let mut is_self_closing = false;
        let mut closed = false;
        while i < bytes.len() {
            let c = bytes[i];
            if c.is_ascii_whitespace() {
                i += 1;
            } else if c == b'>' {
                i += 1;
                closed = true;
                break;
            } else if c == b'/' {
                if bytes.get(i + 1) == Some(&b'>') {
                    is_self_closing = true;
                    closed = true;
                    i += 2;
                    break;
                }
                self.error(ErrorCode::UnexpectedSolidusInTag, i, i + 1);
                i += 1;
            } else {
                let attr = self.scan_attribute(i);
                i = attr.end;
                attributes.push(attr);
            }
        }
        if !closed {
            self.error(ErrorCode::EofInTag, start, bytes.len());
        }
        self.pos = i;

        let in_v_pre = self.in_v_pre
            || attributes
                .iter()
                .any(|a| &source[a.name_start..a.name_end] == "v-pre");
        let mut element = ElementNode::new(self.allocator, tag, self.create_loc(start, i));
        element.ns = (self.options.get_namespace)(
            tag,
            self.stack.last().map(|e| e.element.tag.as_str()),
        );
        element.is_self_closing = is_self_closing;
        for attr in attributes {
            if let Some(prop) = self.build_prop(&attr, in_v_pre, &element.props) {
                element.props.push(prop);
            }
        }
        if !self.in_v_pre {
            element.tag_type = self.determine_element_type(&element);
        }

        if is_self_closing || (self.options.is_void_tag)(tag) || !closed {
            self.add_child(TemplateChildNode::Element(Box::new_in(element, self.allocator)));
            return;
        }

        let is_pre = (self.options.is_pre_tag)(tag);
        self.stack.push(StackEntry {
            element,
            start,
            in_pre: self.in_pre,
            in_v_pre: self.in_v_pre,
        });
        self.in_pre = self.in_pre || is_pre;
        self.in_v_pre = in_v_pre;

        match tag {
            "script" | "style" => self.parse_raw_text(tag, false),
            "textarea" | "title" => self.parse_raw_text(tag, true),
            _ => {}
        }
    }

    /// Content of raw text elements up to their end tag. Only RCDATA
    /// elements see interpolations.
    fn parse_raw_text(&mut self, tag: &str, interpolate: bool) {
        let source = self.source;
        let bytes = source.as_bytes();
        let mut needle = std::vec::Vec::with_capacity(tag.len() + 2);
        needle.extend_from_slice(b"</");
        needle.extend_from_slice(tag.as_bytes());
        let end = memmem::find(&bytes[self.pos..], &needle)
            .map(|found| self.pos + found)
            .unwrap_or(bytes.len());

        let open = self.options.delimiters.0.clone();
        let open = open.as_bytes();
        while self.pos < end {
            if interpolate && bytes[self.pos..end].starts_with(open) {
                self.parse_interpolation();
                continue;
            }
            let run_end = if interpolate {
                memmem::find(&bytes[self.pos + 1..end], open)
                    .map(|found| self.pos + 1 + found)
                    .unwrap_or(end)
            } else {
                end
            };
            let loc = self.create_loc(self.pos, run_end);
            let text = TextNode::new(&source[self.pos..run_end], loc);
            self.add_child(TemplateChildNode::Text(Box::new_in(text, self.allocator)));
            self.pos = run_end;
        }
    }

    fn scan_attribute(&mut self, start: usize) -> RawAttribute {
        let source = self.source;
        let bytes = source.as_bytes();
        let mut i = start;
        if bytes[i] == b'=' {
            self.error(ErrorCode::UnexpectedEqualsSignBeforeAttributeName, i, i + 1);
            i += 1;
        }
        while i < bytes.len() {
            match bytes[i] {
                b'[' => {
                    match memchr(b']', &bytes[i..]) {
                        Some(found) => i += found + 1,
                        None => i = bytes.len(),
                    }
                    continue;
                }
                b'"' | b'\'' | b'<' => {
                    self.error(ErrorCode::UnexpectedCharacterInAttributeName, i, i + 1);
                }
                c if c == b'=' || is_end_of_tag_section(c) => break,
                _ => {}
            }
            i += 1;
        }
        let name_end = i;

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if bytes.get(j) != Some(&b'=') {
            return RawAttribute {
                name_start: start,
                name_end,
                value: None,
                end: name_end,
            };
        }
        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        match bytes.get(j) {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                let value_start = j + 1;
                match memchr(quote, &bytes[value_start..]) {
                    Some(found) => RawAttribute {
                        name_start: start,
                        name_end,
                        value: Some((value_start, value_start + found)),
                        end: value_start + found + 1,
                    },
                    None => {
                        self.error(ErrorCode::EofInTag, start, bytes.len());
                        RawAttribute {
                            name_start: start,
                            name_end,
                            value: Some((value_start, bytes.len())),
                            end: bytes.len(),
                        }
                    }
                }
            }
            Some(b'>') | None => {
                self.error(ErrorCode::MissingAttributeValue, start, j);
                RawAttribute {
                    name_start: start,
                    name_end,
                    value: None,
                    end: j,
                }
            }
            Some(_) => {
                let value_start = j;
                while j < bytes.len() && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                    j += 1;
                }
                RawAttribute {
                    name_start: start,
                    name_end,
                    value: Some((value_start, j)),
                    end: j,
                }
            }
        }
    }

    fn build_prop(
        &mut self,
        attr: &RawAttribute,
        in_v_pre: bool,
        existing: &[PropNode<'a>],
    ) -> Option<PropNode<'a>> {
        let source = self.source;
        let name = &source[attr.name_start..attr.name_end];
        if name == "v-pre" {
            return None;
        }

        if !in_v_pre && is_directive_name(name) {
            return self.build_directive(attr, name).map(PropNode::Directive);
        }

        let duplicate = existing
            .iter()
            .any(|p| matches!(p, PropNode::Attribute(a) if a.name == name));
        if duplicate {
            self.error(ErrorCode::DuplicateAttribute, attr.name_start, attr.end);
            return None;
        }

        let mut node = AttributeNode::new(name, self.create_loc(attr.name_start, attr.end));
        node.name_loc = self.create_loc(attr.name_start, attr.name_end);
        if let Some((start, end)) = attr.value {
            node.value = Some(TextNode::new(&source[start..end], self.create_loc(start, end)));
        }
        Some(PropNode::Attribute(Box::new_in(node, self.allocator)))
    }

    fn build_directive(
        &mut self,
        attr: &RawAttribute,
        raw: &'a str,
    ) -> Option<Box<'a, DirectiveNode<'a>>> {
        let base = attr.name_start;
        let (name, rest_offset, shorthand_prop) = match raw.as_bytes()[0] {
            b':' => ("bind", 1, false),
            b'.' => ("bind", 1, true),
            b'@' => ("on", 1, false),
            b'#' => ("slot", 1, false),
            _ => {
                let body = &raw[2..];
                let name_len = body.find([':', '.']).unwrap_or(body.len());
                if name_len == 0 {
                    self.error(ErrorCode::MissingDirectiveName, attr.name_start, attr.name_end);
                    return None;
                }
                let after = 2 + name_len;
                let rest_offset = if raw.as_bytes().get(after) == Some(&b':') {
                    after + 1
                } else {
                    after
                };
                (&body[..name_len], rest_offset, false)
            }
        };

        let mut dir = DirectiveNode::new(self.allocator, name, self.create_loc(attr.name_start, attr.end));
        dir.raw_name = Some(String::from(raw));
        if shorthand_prop {
            dir.modifiers.push(String::from("prop"));
        }

        let rest = &raw[rest_offset..];
        let arg_len = if rest.starts_with('[') {
            match rest.find(']') {
                Some(close) => close + 1,
                None => {
                    self.error(
                        ErrorCode::MissingDynamicDirectiveArgumentEnd,
                        base + rest_offset,
                        attr.name_end,
                    );
                    rest.len()
                }
            }
        } else if name == "slot" || rest.starts_with('.') {
            if rest.starts_with('.') { 0 } else { rest.len() }
        } else {
            rest.find('.').unwrap_or(rest.len())
        };

        if arg_len > 0 {
            let arg_start = base + rest_offset;
            let arg_raw = &rest[..arg_len];
            let arg = match arg_raw.strip_prefix('[') {
                Some(inner) => {
                    let inner = inner.strip_suffix(']').unwrap_or(inner);
                    SimpleExpressionNode::new(
                        inner,
                        false,
                        self.create_loc(arg_start + 1, arg_start + 1 + inner.len()),
                    )
                }
                None => SimpleExpressionNode::new(
                    arg_raw,
                    true,
                    self.create_loc(arg_start, arg_start + arg_len),
                ),
            };
            dir.arg = Some(ExpressionNode::Simple(Box::new_in(arg, self.allocator)));
        }

        for modifier in rest[arg_len..].split('.').filter(|m| !m.is_empty()) {
            dir.modifiers.push(String::from(modifier));
        }

        if let Some((start, end)) = attr.value {
            let source = self.source;
            let value = &source[start..end];
            if !value.trim().is_empty() {
                let exp = SimpleExpressionNode::new(value, false, self.create_loc(start, end));
                if name == "for" {
                    dir.for_parse_result = parse_for_expression(self.allocator, &exp);
                }
                dir.exp = Some(ExpressionNode::Simple(Box::new_in(exp, self.allocator)));
            }
        }

        Some(Box::new_in(dir, self.allocator))
    }

    fn parse_close_tag(&mut self) {
        let source = self.source;
        let bytes = source.as_bytes();
        let start = self.pos;
        let name_start = start + 2;
        let mut name_end = name_start;
        while name_end < bytes.len() && !is_end_of_tag_section(bytes[name_end]) {
            name_end += 1;
        }
        let end = match memchr(b'>', &bytes[name_end..]) {
            Some(found) => name_end + found + 1,
            None => {
                self.error(ErrorCode::EofInTag, start, bytes.len());
                self.pos = bytes.len();
                return;
            }
        };
        self.pos = end;

        if name_end == name_start {
            self.error(ErrorCode::MissingEndTagName, start, end);
            return;
        }
        if !source[name_end..end - 1].trim().trim_end_matches('/').is_empty() {
            self.error(ErrorCode::EndTagWithAttributes, name_end, end);
        }

        let tag = &source[name_start..name_end];
        let Some(depth) = self
            .stack
            .iter()
            .rposition(|entry| entry.element.tag.eq_ignore_ascii_case(tag))
        else {
            self.error(ErrorCode::InvalidEndTag, start, end);
            return;
        };

        while self.stack.len() > depth + 1 {
            if let Some(entry) = self.stack.pop() {
                let open_start = entry.element.loc.start.offset as usize;
                let open_end = entry.element.loc.end.offset as usize;
                self.error(ErrorCode::MissingEndTag, open_start, open_end);
                self.close_element(entry, start);
            }
        }
        if let Some(entry) = self.stack.pop() {
            self.close_element(entry, end);
        }
    }

    /// Determine element type (element, component, slot, template)
    fn determine_element_type(&self, element: &ElementNode<'a>) -> ElementType {
        let tag = element.tag.as_str();
        if tag == "slot" {
            return ElementType::Slot;
        }
        if tag == "template" {
            let has_structural_directive = element.props.iter().any(|p| {
                matches!(p, PropNode::Directive(d)
                    if matches!(d.name.as_str(), "if" | "else-if" | "else" | "for" | "slot"))
            });
            if has_structural_directive {
                return ElementType::Template;
            }
        }
        if self.is_component(element) {
            return ElementType::Component;
        }
        ElementType::Element
    }

    fn is_component(&self, element: &ElementNode<'a>) -> bool {
        let tag = element.tag.as_str();
        if tag == "component" || gesso_relief::core_builtin_component(tag).is_some() {
            return true;
        }
        if matches!(tag, "Transition" | "TransitionGroup") {
            return true;
        }
        let is_vue_component = element.props.iter().any(|p| {
            matches!(p, PropNode::Attribute(a)
                if a.name == "is" && a.value.as_ref().is_some_and(|v| v.content.starts_with("vue:")))
        });
        if is_vue_component {
            return true;
        }
        if (self.options.is_custom_element)(tag) {
            return false;
        }
        match self.options.is_native_tag {
            Some(is_native) => !is_native(tag),
            None => tag.starts_with(|c: char| c.is_ascii_uppercase()),
        }
    }
}

/// Check if character ends a tag name or attribute name
#[inline]
fn is_end_of_tag_section(c: u8) -> bool {
    c == b'/' || c == b'>' || c.is_ascii_whitespace()
}

fn is_directive_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.first() {
        Some(b':' | b'@' | b'#') => true,
        Some(b'.') => bytes.len() > 1,
        _ => name.len() > 2 && name.starts_with("v-"),
    }
}

/// Whitespace handling in condense mode: whitespace-only nodes are dropped
/// at the edges of a child list, next to comments, and between elements when
/// they contain a newline; other whitespace runs collapse to a single space.
fn condense_whitespace<'a>(children: &mut Vec<'a, TemplateChildNode<'a>>, is_pre_tag: fn(&str) -> bool) {
    let mut i = 0;
    while i < children.len() {
        let remove = match &children[i] {
            TemplateChildNode::Text(text) if text.content.trim().is_empty() => {
                let prev = i.checked_sub(1).and_then(|p| children.get(p));
                let next = children.get(i + 1);
                match (prev, next) {
                    (None, _) | (_, None) => true,
                    (Some(TemplateChildNode::Comment(_)), _) | (_, Some(TemplateChildNode::Comment(_))) => true,
                    (Some(TemplateChildNode::Element(_)), Some(TemplateChildNode::Element(_))) => {
                        text.content.contains('\n')
                    }
                    _ => false,
                }
            }
            _ => false,
        };
        if remove {
            children.remove(i);
            continue;
        }

        match &mut children[i] {
            TemplateChildNode::Text(text) => {
                if text.content.contains(|c: char| c.is_ascii_whitespace()) {
                    text.content = collapse_whitespace(&text.content);
                }
            }
            TemplateChildNode::Element(el) if !is_pre_tag(el.tag.as_str()) => {
                condense_whitespace(&mut el.children, is_pre_tag);
            }
            _ => {}
        }
        i += 1;
    }
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_ws = false;
    for c in s.chars() {
        if c.is_ascii_whitespace() {
            if !in_ws {
                out.push(' ');
            }
            in_ws = true;
        } else {
            out.push(c);
            in_ws = false;
        }
    }
    out
}

/// Parse a template
pub fn parse<'a>(allocator: &'a Bump, source: &'a str) -> (RootNode<'a>, Vec<'a, CompilerError>) {
    Parser::new(allocator, source).parse()
}

/// Parse a template with options
pub fn parse_with_options<'a>(
    allocator: &'a Bump,
    source: &'a str,
    options: ParserOptions,
) -> (RootNode<'a>, Vec<'a, CompilerError>) {
    Parser::with_options(allocator, source, options).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_element<'r, 'a>(root: &'r RootNode<'a>) -> &'r ElementNode<'a> {
        match &root.children[0] {
            TemplateChildNode::Element(el) => el,
            other => panic!("Expected element node, got {:?}", other.node_type()),
        }
    }

    fn first_directive<'r, 'a>(el: &'r ElementNode<'a>) -> &'r DirectiveNode<'a> {
        match &el.props[0] {
            PropNode::Directive(dir) => dir,
            PropNode::Attribute(_) => panic!("Expected directive"),
        }
    }

    #[test]
    fn test_parse_simple_element() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, "<div></div>");

        assert!(errors.is_empty());
        assert_eq!(root.children.len(), 1);
        let el = first_element(&root);
        assert_eq!(el.tag.as_str(), "div");
        assert!(!el.is_self_closing);
        assert_eq!(el.loc.source, "<div></div>");
    }

    #[test]
    fn test_parse_interpolation() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, "{{ msg }}");

        assert!(errors.is_empty());
        let TemplateChildNode::Interpolation(interp) = &root.children[0] else {
            panic!("Expected interpolation node");
        };
        let expr = interp.content.as_simple().unwrap();
        assert_eq!(expr.content, "msg");
        assert_eq!(expr.loc.start.offset, 3);
        assert_eq!(interp.loc.source, "{{ msg }}");
    }

    #[test]
    fn test_parse_custom_delimiters() {
        let allocator = Bump::new();
        let options = ParserOptions {
            delimiters: (String::from("${"), String::from("}")),
            ..Default::default()
        };
        let (root, errors) = parse_with_options(&allocator, "a ${ b } {{ c }}", options);
        assert!(errors.is_empty());
        assert_eq!(root.children.len(), 3);
        assert!(matches!(root.children[1], TemplateChildNode::Interpolation(_)));
        assert!(matches!(&root.children[2], TemplateChildNode::Text(t) if t.content == " {{ c }}"));
    }

    #[test]
    fn test_parse_directive() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, r#"<div v-if="ok"></div>"#);

        assert!(errors.is_empty());
        let dir = first_directive(first_element(&root));
        assert_eq!(dir.name, "if");
        assert_eq!(dir.exp_content(), Some("ok"));
        let exp = dir.exp.as_ref().unwrap();
        assert_eq!(exp.loc().source, "ok");
        assert_eq!(exp.loc().start.offset, 11);
    }

    #[test]
    fn test_parse_shorthands() {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, r#"<div :class="cls" @click.stop="go" #header .value="v"></div>"#);
        let el = first_element(&root);
        let names: std::vec::Vec<_> = el
            .props
            .iter()
            .map(|p| match p {
                PropNode::Directive(d) => (d.name.as_str(), d.static_arg().unwrap_or("")),
                PropNode::Attribute(_) => ("attr", ""),
            })
            .collect();
        assert_eq!(
            names,
            [("bind", "class"), ("on", "click"), ("slot", "header"), ("bind", "value")]
        );
        let PropNode::Directive(on) = &el.props[1] else { unreachable!() };
        assert!(on.has_modifier("stop"));
        let PropNode::Directive(prop) = &el.props[3] else { unreachable!() };
        assert!(prop.has_modifier("prop"));
    }

    #[test]
    fn test_parse_dynamic_directive_arg() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, r#"<div v-bind:[key].camel="value"></div>"#);

        assert!(errors.is_empty());
        let dir = first_directive(first_element(&root));
        let arg = dir.arg.as_ref().and_then(|a| a.as_simple()).unwrap();
        assert_eq!(arg.content, "key");
        assert!(!arg.is_static);
        assert_eq!(dir.modifiers.as_slice(), ["camel"]);
    }

    #[test]
    fn test_parse_v_for() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, r#"<li v-for="(item, i) in items"></li>"#);

        assert!(errors.is_empty());
        let dir = first_directive(first_element(&root));
        let result = dir.for_parse_result.as_ref().unwrap();
        assert_eq!(result.alias_params(), [Some("item"), Some("i"), None]);
        assert_eq!(result.source.as_simple().unwrap().content, "items");
    }

    #[test]
    fn test_parse_self_closing_and_void() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, "<div><Comp/><input></div>");

        assert!(errors.is_empty());
        let el = first_element(&root);
        assert_eq!(el.children.len(), 2);
        let TemplateChildNode::Element(comp) = &el.children[0] else { unreachable!() };
        assert!(comp.is_self_closing);
        assert_eq!(comp.tag_type, ElementType::Component);
    }

    #[test]
    fn test_parse_comment() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, "<!-- note --><p></p>");
        assert!(errors.is_empty());
        assert!(matches!(&root.children[0], TemplateChildNode::Comment(c) if c.content == " note "));
    }

    #[test]
    fn test_parse_whitespace_condense() {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, "<div>\n  <span>a   b</span>\n  <span>c</span>\n</div>");
        let el = first_element(&root);
        assert_eq!(el.children.len(), 2);
        let TemplateChildNode::Element(span) = &el.children[0] else { unreachable!() };
        assert!(matches!(&span.children[0], TemplateChildNode::Text(t) if t.content == "a b"));
    }

    #[test]
    fn test_parse_template_types() {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, r#"<template v-if="a"></template><slot></slot><template></template>"#);
        let types: std::vec::Vec<_> = root
            .children
            .iter()
            .filter_map(|c| match c {
                TemplateChildNode::Element(el) => Some(el.tag_type),
                _ => None,
            })
            .collect();
        assert_eq!(types, [ElementType::Template, ElementType::Slot, ElementType::Element]);
    }

    #[test]
    fn test_parse_custom_element_is_not_component() {
        let allocator = Bump::new();
        let options = ParserOptions {
            is_native_tag: Some(|tag| tag == "div"),
            is_custom_element: |tag| tag == "my-widget",
            ..ParserOptions::default()
        };
        let (root, _) = parse_with_options(&allocator, "<div><my-widget/><other-thing/></div>", options);
        let types: std::vec::Vec<_> = first_element(&root)
            .children
            .iter()
            .filter_map(|c| match c {
                TemplateChildNode::Element(el) => Some(el.tag_type),
                _ => None,
            })
            .collect();
        assert_eq!(types, [ElementType::Element, ElementType::Component]);
    }

    #[test]
    fn test_parse_v_pre() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, r#"<div v-pre :id="x">{{ raw }}</div>"#);
        assert!(errors.is_empty());
        let el = first_element(&root);
        assert!(matches!(&el.props[0], PropNode::Attribute(a) if a.name == ":id"));
        assert!(matches!(&el.children[0], TemplateChildNode::Text(t) if t.content == "{{ raw }}"));
    }

    #[test]
    fn test_parse_error_missing_end_tag() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, "<div><span></div>");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::MissingEndTag);
        let el = first_element(&root);
        assert_eq!(el.children.len(), 1);
    }

    #[test]
    fn test_parse_error_invalid_end_tag() {
        let allocator = Bump::new();
        let (_, errors) = parse(&allocator, "<div></span></div>");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::InvalidEndTag);
    }

    #[test]
    fn test_parse_error_duplicate_attribute() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, r#"<div id="a" id="b"></div>"#);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::DuplicateAttribute);
        assert_eq!(first_element(&root).props.len(), 1);
    }

    #[test]
    fn test_parse_error_missing_interpolation_end() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, "<p>{{ oops</p>");
        assert_eq!(errors[0].code, ErrorCode::MissingInterpolationEnd);
        assert!(!root.children.is_empty());
    }

    #[test]
    fn test_parse_textarea_rcdata() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, "<textarea><b>{{ x }}</b></textarea>");
        assert!(errors.is_empty());
        let el = first_element(&root);
        assert!(matches!(&el.children[0], TemplateChildNode::Text(t) if t.content == "<b>"));
        assert!(matches!(el.children[1], TemplateChildNode::Interpolation(_)));
    }

    fn assert_contained(parent: &SourceLocation, children: &[TemplateChildNode<'_>]) {
        for child in children {
            assert!(parent.contains(child.loc()), "{:?} escapes {:?}", child.loc(), parent);
            if let TemplateChildNode::Element(el) = child {
                for prop in el.props.iter() {
                    assert!(el.loc.contains(prop.loc()));
                }
                assert_contained(&el.loc, &el.children);
            }
        }
    }

    #[test]
    fn test_span_containment() {
        let allocator = Bump::new();
        let source = "<div id=\"a\">\n  <ul>\n    <li v-for=\"x in xs\" :key=\"x\">{{ x }} item</li>\n  </ul>\n  <!-- c -->\n</div>";
        let (root, errors) = parse(&allocator, source);
        assert!(errors.is_empty());
        assert_eq!(root.loc.end.offset as usize, source.len());
        assert_contained(&root.loc, &root.children);

        let ul = match &first_element(&root).children[0] {
            TemplateChildNode::Element(el) => el,
            _ => unreachable!(),
        };
        assert_eq!(ul.loc.start.line, 2);
        assert_eq!(ul.loc.start.column, 3);
    }
}

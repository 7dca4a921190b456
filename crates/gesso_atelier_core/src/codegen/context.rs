//! Code generation context and result types.

use gesso_relief::ast::{RuntimeHelper, SourceLocation};
use gesso_relief::options::{CodegenOptions, CodegenStyle};
use rustc_hash::FxHashSet;
use serde::Serialize;

/// Code generation context writing into a string buffer
pub struct CodegenContext {
    /// Generated code of the current segment
    pub(super) code: String,
    /// Current indentation level
    pub(super) indent_level: u32,
    pub(super) options: CodegenOptions,
    /// Prefix calls with `/*#__PURE__*/` (hoisted declarations)
    pub(super) pure: bool,
    /// Helpers referenced by the emitted code
    pub(super) used_helpers: FxHashSet<RuntimeHelper>,
    /// Zero-based position of the end of `code`
    line: u32,
    column: u32,
    mappings: Vec<Mapping>,
}

/// A line/column pair. Lines are 1-based, columns 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineColumn {
    pub line: u32,
    pub column: u32,
}

/// Generated position and the template position it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mapping {
    pub generated: LineColumn,
    pub original: LineColumn,
}

/// Finished piece of output with positions relative to its own start.
pub(super) struct Segment {
    pub(super) code: String,
    pub(super) mappings: Vec<Mapping>,
}

/// Code generation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenResult {
    /// Complete program: preamble followed by the render function
    pub code: String,
    /// Helper imports, module imports and hoisted declarations
    pub preamble: String,
    /// Helpers used by the code, in enum order
    pub helpers: Vec<RuntimeHelper>,
    pub hoist_count: usize,
    pub cache_count: u32,
    /// JSON array of mappings, when source maps are enabled
    pub map: Option<String>,
}

impl CodegenContext {
    pub fn new(options: CodegenOptions) -> Self {
        Self {
            code: String::with_capacity(1024),
            indent_level: 0,
            options,
            pure: false,
            used_helpers: FxHashSet::default(),
            line: 0,
            column: 0,
            mappings: Vec::new(),
        }
    }

    fn is_compact(&self) -> bool {
        self.options.style == CodegenStyle::Compact
    }

    /// Push code to the buffer
    #[inline]
    pub fn push(&mut self, code: &str) {
        if self.options.source_map {
            self.advance(code);
        }
        self.code.push_str(code);
    }

    /// Push code that stands for the template span `loc`.
    pub fn push_mapped(&mut self, code: &str, loc: &SourceLocation) {
        if self.options.source_map && !loc.is_stub() {
            self.mappings.push(Mapping {
                generated: LineColumn {
                    line: self.line,
                    column: self.column,
                },
                original: LineColumn {
                    line: loc.start.line,
                    column: loc.start.column.saturating_sub(1),
                },
            });
        }
        self.push(code);
    }

    fn advance(&mut self, code: &str) {
        match code.rfind('\n') {
            Some(last) => {
                self.line += memchr::memchr_iter(b'\n', code.as_bytes()).count() as u32;
                self.column = (code.len() - last - 1) as u32;
            }
            None => self.column += code.len() as u32,
        }
    }

    /// Break the line at the current indentation. Compact output uses a
    /// single space instead.
    pub fn newline(&mut self) {
        if self.is_compact() {
            self.push(" ");
            return;
        }
        self.push("\n");
        for _ in 0..self.indent_level {
            self.push("  ");
        }
    }

    /// Increase indentation and break the line
    pub fn indent(&mut self) {
        self.indent_level += 1;
        self.newline();
    }

    /// Decrease indentation and break the line
    pub fn deindent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
        self.newline();
    }

    /// End a statement; the next one starts on a new line.
    pub fn end_statement(&mut self) {
        self.terminate();
        self.newline();
    }

    /// `;` in compact output
    pub fn terminate(&mut self) {
        if self.is_compact() {
            self.push(";");
        }
    }

    /// Push the `_name` alias of `helper` and record its use.
    pub fn push_helper(&mut self, helper: RuntimeHelper) {
        self.used_helpers.insert(helper);
        self.push("_");
        self.push(helper.name());
    }

    #[inline]
    pub fn push_pure(&mut self) {
        if self.pure {
            self.push("/*#__PURE__*/ ");
        }
    }

    /// Take the code written so far and start a fresh segment.
    pub(super) fn take_segment(&mut self) -> Segment {
        self.line = 0;
        self.column = 0;
        Segment {
            code: std::mem::take(&mut self.code),
            mappings: std::mem::take(&mut self.mappings),
        }
    }

    /// Helpers used so far, in enum order
    pub fn helpers(&self) -> Vec<RuntimeHelper> {
        let mut helpers: Vec<_> = self.used_helpers.iter().copied().collect();
        helpers.sort();
        helpers
    }
}

impl Segment {
    /// Mappings shifted to where the segment starts in the final output,
    /// given the text that precedes it.
    pub(super) fn placed_after(&self, prefix: &str) -> impl Iterator<Item = Mapping> + '_ {
        let start_line = memchr::memchr_iter(b'\n', prefix.as_bytes()).count() as u32;
        let start_column = match prefix.rfind('\n') {
            Some(last) => (prefix.len() - last - 1) as u32,
            None => prefix.len() as u32,
        };
        self.mappings.iter().map(move |m| Mapping {
            generated: LineColumn {
                line: m.generated.line + start_line + 1,
                column: if m.generated.line == 0 {
                    m.generated.column + start_column
                } else {
                    m.generated.column
                },
            },
            original: m.original,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesso_relief::ast::Position;

    #[test]
    fn test_indentation() {
        let mut ctx = CodegenContext::new(CodegenOptions::default());
        ctx.push("{");
        ctx.indent();
        ctx.push("a");
        ctx.deindent();
        ctx.push("}");
        assert_eq!(ctx.code, "{\n  a\n}");
    }

    #[test]
    fn test_compact_newlines() {
        let options = CodegenOptions {
            style: CodegenStyle::Compact,
            ..Default::default()
        };
        let mut ctx = CodegenContext::new(options);
        ctx.push("a");
        ctx.end_statement();
        ctx.push("b");
        assert_eq!(ctx.code, "a; b");
    }

    #[test]
    fn test_mappings_track_position() {
        let options = CodegenOptions {
            source_map: true,
            ..Default::default()
        };
        let mut ctx = CodegenContext::new(options);
        ctx.push("line\n  ");
        let loc = SourceLocation::new(Position::new(3, 1, 4), Position::new(6, 1, 7), "msg");
        ctx.push_mapped("msg", &loc);
        let segment = ctx.take_segment();
        let placed: Vec<_> = segment.placed_after("header\n").collect();
        assert_eq!(
            placed,
            [Mapping {
                generated: LineColumn { line: 3, column: 2 },
                original: LineColumn { line: 1, column: 3 },
            }]
        );
    }
}

//! Expression analysis.
//!
//! Template expressions are parsed with `oxc_parser` and walked for free
//! identifier references. Each one is classified as a scope-bound alias, an
//! allowed global, or a render-context reference, and context references get
//! the `_ctx.` prefix when prefixing is on. The walk also settles the
//! expression's constness.

use gesso_carton::{is_globally_allowed, is_simple_identifier, SmallVec, String, Vec};
use gesso_relief::ast::*;
use gesso_relief::errors::ErrorCode;
use oxc_allocator::Allocator as OxcAllocator;
use oxc_ast::ast as oxc_ast_types;
use oxc_ast::visit::walk::{
    walk_arrow_function_expression, walk_block_statement, walk_catch_clause, walk_function,
    walk_object_property,
};
use oxc_ast::Visit;
use oxc_parser::Parser;
use oxc_span::SourceType;
use oxc_syntax::scope::ScopeFlags;

use crate::transform::{NodeAction, NodeTransform, SiblingCursor, TransformContext};

/// Node transform processing interpolations and directive expressions.
pub struct TransformExpression;

impl NodeTransform for TransformExpression {
    fn name(&self) -> &'static str {
        "expression"
    }

    fn enter<'a>(
        &self,
        node: &mut TemplateChildNode<'a>,
        _cursor: &mut SiblingCursor<'_, 'a>,
        ctx: &mut TransformContext<'a>,
    ) -> NodeAction<'a> {
        match node {
            TemplateChildNode::Interpolation(interpolation) => {
                process_expression_node(&mut interpolation.content, ctx);
            }
            TemplateChildNode::Element(el) => {
                for prop in el.props.iter_mut() {
                    let PropNode::Directive(dir) = prop else {
                        continue;
                    };
                    // Aliases are declarations, not reads
                    if dir.name == "for" {
                        continue;
                    }
                    // Slot params declare names too. Handlers are processed by
                    // the v-on transform, which needs the raw source to tell
                    // inline statements apart
                    let is_handler = dir.name == "on" && dir.arg.is_some();
                    if !is_handler && dir.name != "slot" {
                        if let Some(exp) = &mut dir.exp {
                            process_expression_node(exp, ctx);
                        }
                    }
                    if let Some(arg) = &mut dir.arg {
                        if !arg.is_static() {
                            process_expression_node(arg, ctx);
                        }
                    }
                }
            }
            _ => {}
        }
        NodeAction::Continue
    }
}

/// Process a simple expression, or every simple part of a compound one.
pub fn process_expression_node<'a>(exp: &mut ExpressionNode<'a>, ctx: &mut TransformContext<'a>) {
    match exp {
        ExpressionNode::Simple(simple) => process_expression(simple, ctx),
        ExpressionNode::Compound(compound) => {
            for child in compound.children.iter_mut() {
                match child {
                    CompoundExpressionChild::Simple(simple) => process_expression(simple, ctx),
                    CompoundExpressionChild::Interpolation(i) => {
                        process_expression_node(&mut i.content, ctx)
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Classify the identifiers of `exp`, record context references, prefix them
/// when `prefix_identifiers` is on, and set its constness and scoped names.
pub fn process_expression<'a>(exp: &mut SimpleExpressionNode<'a>, ctx: &mut TransformContext<'a>) {
    if exp.is_static || exp.content.trim().is_empty() {
        return;
    }
    let source = exp.content.clone();

    let Some(scan) = scan_expression(&source) else {
        ctx.report(ErrorCode::InvalidExpression, Some(exp.loc.clone()));
        return;
    };

    let prefix = ctx.options.prefix_identifiers;
    let mut rewritten = String::with_capacity(source.len() + 8);
    let mut last = 0;
    let mut scoped: SmallVec<[String; 4]> = SmallVec::new();
    let mut has_reference = false;
    let mut has_global = false;

    for ident in scan.idents.iter() {
        let name = &source[ident.start..ident.end];
        if ctx.is_scoped(name) {
            ctx.note_scope_read(name);
            if !scoped.iter().any(|s| s == name) {
                scoped.push(String::from(name));
            }
            continue;
        }
        if is_globally_allowed(name) {
            has_global = true;
            continue;
        }
        has_reference = true;
        ctx.add_reference(name);
        if prefix {
            rewritten.push_str(&source[last..ident.start]);
            if ident.shorthand {
                rewritten.push_str(name);
                rewritten.push_str(": ");
            }
            rewritten.push_str("_ctx.");
            rewritten.push_str(name);
            last = ident.end;
        }
    }
    if prefix && last > 0 {
        rewritten.push_str(&source[last..]);
        exp.content = rewritten;
    }

    exp.const_type = if has_reference || !scoped.is_empty() {
        ConstantType::NotConstant
    } else if has_global || scan.binds_locals {
        ConstantType::CanSkipPatch
    } else {
        ConstantType::CanStringify
    };
    if !scoped.is_empty() {
        exp.identifiers = Some(Vec::from_iter_in(scoped, ctx.allocator));
    }
}

// ============================================================================
// Identifier collection
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IdentRef {
    start: usize,
    end: usize,
    /// `{ foo }` object shorthand; prefixing must expand it
    shorthand: bool,
}

#[derive(Debug, Default)]
struct Scan {
    /// Free references in source order
    idents: SmallVec<[IdentRef; 8]>,
    /// Whether the expression declares any name of its own
    binds_locals: bool,
}

/// Free identifier references of `src`, or `None` when it does not parse.
///
/// `src` is tried as a single expression first. Inline handlers may hold a
/// statement list, so a failed expression parse falls back to a program.
fn scan_expression(src: &str) -> Option<Scan> {
    let allocator = OxcAllocator::default();
    let source_type = SourceType::default().with_module(true);
    let mut collector = IdentifierCollector::default();

    match Parser::new(&allocator, src, source_type).parse_expression() {
        Ok(expr) => collector.visit_expression(&expr),
        Err(_) => {
            let ret = Parser::new(&allocator, src, source_type).parse();
            if ret.panicked || !ret.errors.is_empty() {
                return None;
            }
            collector.visit_program(&ret.program);
        }
    }

    let mut idents = collector.idents;
    idents.sort_by_key(|ident| ident.start);
    Some(Scan {
        idents,
        binds_locals: collector.binds_locals,
    })
}

/// Walks an oxc AST, tracking the names each function or block binds.
#[derive(Default)]
struct IdentifierCollector {
    /// Bindings of the enclosing scopes, innermost last
    scopes: std::vec::Vec<SmallVec<[String; 4]>>,
    idents: SmallVec<[IdentRef; 8]>,
    binds_locals: bool,
}

impl IdentifierCollector {
    fn is_local(&self, name: &str) -> bool {
        self.scopes
            .iter()
            .any(|scope| scope.iter().any(|bound| bound == name))
    }

    fn reference(&mut self, name: &str, start: u32, end: u32, shorthand: bool) {
        if self.is_local(name) {
            return;
        }
        self.idents.push(IdentRef {
            start: start as usize,
            end: end as usize,
            shorthand,
        });
    }

    fn scoped(&mut self, walk: impl FnOnce(&mut Self)) {
        self.scopes.push(SmallVec::new());
        walk(self);
        self.scopes.pop();
    }
}

impl<'a> Visit<'a> for IdentifierCollector {
    fn visit_identifier_reference(&mut self, ident: &oxc_ast_types::IdentifierReference<'a>) {
        self.reference(ident.name.as_str(), ident.span.start, ident.span.end, false);
    }

    fn visit_binding_identifier(&mut self, ident: &oxc_ast_types::BindingIdentifier<'a>) {
        self.binds_locals = true;
        // Top-level statement bindings of an inline handler
        if self.scopes.is_empty() {
            self.scopes.push(SmallVec::new());
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.push(String::from(ident.name.as_str()));
        }
    }

    fn visit_object_property(&mut self, prop: &oxc_ast_types::ObjectProperty<'a>) {
        if prop.shorthand {
            if let oxc_ast_types::Expression::Identifier(ident) = &prop.value {
                self.reference(ident.name.as_str(), ident.span.start, ident.span.end, true);
                return;
            }
        }
        walk_object_property(self, prop);
    }

    fn visit_arrow_function_expression(
        &mut self,
        arrow: &oxc_ast_types::ArrowFunctionExpression<'a>,
    ) {
        self.scoped(|this| walk_arrow_function_expression(this, arrow));
    }

    fn visit_function(&mut self, func: &oxc_ast_types::Function<'a>, flags: ScopeFlags) {
        self.scoped(|this| walk_function(this, func, flags));
    }

    fn visit_block_statement(&mut self, block: &oxc_ast_types::BlockStatement<'a>) {
        self.scoped(|this| walk_block_statement(this, block));
    }

    fn visit_catch_clause(&mut self, clause: &oxc_ast_types::CatchClause<'a>) {
        self.scoped(|this| walk_catch_clause(this, clause));
    }
}

/// Whether `exp` reads a name bound by an enclosing scope.
pub fn has_scope_ref(exp: &ExpressionNode<'_>, ctx: &TransformContext<'_>) -> bool {
    if !exp.scoped_identifiers().is_empty() {
        return true;
    }
    match exp {
        ExpressionNode::Simple(s) => is_simple_identifier(s.content.trim()) && ctx.is_scoped(s.content.trim()),
        ExpressionNode::Compound(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::base_transform_pipeline;
    use gesso_carton::Bump;
    use gesso_relief::options::TransformOptions;
    use std::rc::Rc;

    fn context(allocator: &Bump, prefix: bool) -> TransformContext<'_> {
        let options = TransformOptions {
            prefix_identifiers: prefix,
            ..Default::default()
        };
        TransformContext::new(allocator, options, Rc::new(base_transform_pipeline()))
    }

    fn rewrite(src: &str) -> std::string::String {
        let allocator = Bump::new();
        let mut ctx = context(&allocator, true);
        let mut exp = SimpleExpressionNode::new(src, false, SourceLocation::STUB);
        process_expression(&mut exp, &mut ctx);
        exp.content.to_string()
    }

    #[test]
    fn test_prefix_members_and_calls() {
        assert_eq!(rewrite("a + b.c"), "_ctx.a + _ctx.b.c");
        assert_eq!(rewrite("foo(bar, 1)"), "_ctx.foo(_ctx.bar, 1)");
        assert_eq!(rewrite("a?.b[c]"), "_ctx.a?.b[_ctx.c]");
        assert_eq!(rewrite("ok ? yes : no"), "_ctx.ok ? _ctx.yes : _ctx.no");
    }

    #[test]
    fn test_globals_and_literals_untouched() {
        assert_eq!(rewrite("Math.max(a, 1)"), "Math.max(_ctx.a, 1)");
        assert_eq!(rewrite("'a' + \"b\" + 1.5"), "'a' + \"b\" + 1.5");
        assert_eq!(rewrite("typeof x === 'string'"), "typeof _ctx.x === 'string'");
        assert_eq!(rewrite("this.x || null"), "this.x || null");
    }

    #[test]
    fn test_object_keys_and_shorthand() {
        assert_eq!(rewrite("{ foo: bar, baz }"), "{ foo: _ctx.bar, baz: _ctx.baz }");
        assert_eq!(rewrite("{ active: isActive }"), "{ active: _ctx.isActive }");
        assert_eq!(rewrite("{ ...rest, a: 1 }"), "{ ..._ctx.rest, a: 1 }");
    }

    #[test]
    fn test_template_literal() {
        assert_eq!(rewrite("`hi ${name}!`"), "`hi ${_ctx.name}!`");
        assert_eq!(rewrite("`${a}${`${b}`}`"), "`${_ctx.a}${`${_ctx.b}`}`");
    }

    #[test]
    fn test_arrow_and_function_params_are_local() {
        assert_eq!(rewrite("list.map(x => x * k)"), "_ctx.list.map(x => x * _ctx.k)");
        assert_eq!(rewrite("(a, b) => a + c"), "(a, b) => a + _ctx.c");
        assert_eq!(
            rewrite("function (e) { handle(e) }"),
            "function (e) { _ctx.handle(e) }"
        );
    }

    #[test]
    fn test_params_do_not_leak_past_their_function() {
        assert_eq!(
            rewrite("list.map(x => x).length + x"),
            "_ctx.list.map(x => x).length + _ctx.x"
        );
        assert_eq!(
            rewrite("items.filter(function (i) { return i }).concat(i)"),
            "_ctx.items.filter(function (i) { return i }).concat(_ctx.i)"
        );
        assert_eq!(
            rewrite("a.map(x => b.map(y => x + y + z))"),
            "_ctx.a.map(x => _ctx.b.map(y => x + y + _ctx.z))"
        );

        let allocator = Bump::new();
        let mut ctx = context(&allocator, false);
        let mut exp = SimpleExpressionNode::new("[1].map(x => x)[0] + x", false, SourceLocation::STUB);
        process_expression(&mut exp, &mut ctx);
        assert_eq!(exp.const_type, ConstantType::NotConstant);
        assert_eq!(ctx.references(), &[String::from("x")]);
    }

    #[test]
    fn test_regex_literal() {
        let allocator = Bump::new();
        let mut ctx = context(&allocator, true);
        let mut exp = SimpleExpressionNode::new("/[(]/.test(s)", false, SourceLocation::STUB);
        process_expression(&mut exp, &mut ctx);
        assert_eq!(exp.content, "/[(]/.test(_ctx.s)");
        assert!(ctx.errors().is_empty());
        assert_eq!(rewrite("a / b / c"), "_ctx.a / _ctx.b / _ctx.c");
    }

    #[test]
    fn test_statement_list() {
        assert_eq!(rewrite("a(); b(c)"), "_ctx.a(); _ctx.b(_ctx.c)");
        assert_eq!(
            rewrite("const n = count + 1; save(n)"),
            "const n = _ctx.count + 1; _ctx.save(n)"
        );
    }

    #[test]
    fn test_constness() {
        let allocator = Bump::new();
        let mut ctx = context(&allocator, false);
        let mut literal = SimpleExpressionNode::new("1 + 2", false, SourceLocation::STUB);
        process_expression(&mut literal, &mut ctx);
        assert_eq!(literal.const_type, ConstantType::CanStringify);

        let mut global = SimpleExpressionNode::new("Math.PI", false, SourceLocation::STUB);
        process_expression(&mut global, &mut ctx);
        assert_eq!(global.const_type, ConstantType::CanSkipPatch);

        let mut dynamic = SimpleExpressionNode::new("msg", false, SourceLocation::STUB);
        process_expression(&mut dynamic, &mut ctx);
        assert_eq!(dynamic.const_type, ConstantType::NotConstant);
        // No prefixing without the option
        assert_eq!(dynamic.content, "msg");
        assert_eq!(ctx.references(), &[String::from("msg")]);
    }

    #[test]
    fn test_scoped_identifiers() {
        let allocator = Bump::new();
        let mut ctx = context(&allocator, true);
        ctx.push_scope([String::from("item")]);
        let mut exp = SimpleExpressionNode::new("item.id + other", false, SourceLocation::STUB);
        process_expression(&mut exp, &mut ctx);
        assert_eq!(exp.content, "item.id + _ctx.other");
        assert_eq!(
            exp.identifiers.as_deref(),
            Some(&[String::from("item")][..])
        );
        assert_eq!(ctx.references(), &[String::from("other")]);
    }

    #[test]
    fn test_unbalanced_reports() {
        let allocator = Bump::new();
        let mut ctx = context(&allocator, true);
        let mut exp = SimpleExpressionNode::new("foo(", false, SourceLocation::STUB);
        process_expression(&mut exp, &mut ctx);
        assert_eq!(exp.content, "foo(");
        assert_eq!(ctx.errors().len(), 1);
        assert_eq!(ctx.errors()[0].code, ErrorCode::InvalidExpression);

        let mut exp = SimpleExpressionNode::new("'open", false, SourceLocation::STUB);
        process_expression(&mut exp, &mut ctx);
        assert_eq!(ctx.errors().len(), 2);
    }
}

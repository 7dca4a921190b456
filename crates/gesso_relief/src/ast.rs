//! Template AST node types.
//!
//! Two families live here: the template nodes produced by the parser and
//! rewritten by transforms, and the generated-code nodes transforms attach to
//! them for codegen. Every node is allocated in the compilation's bump arena.
//!
//! Lowering moves template children into the codegen node that renders them,
//! so each node keeps exactly one owner. Hoisted nodes and cache slots are
//! referenced by index only.

use gesso_carton::{Box, Bump, PatchFlags, String, Vec};
use serde::{Deserialize, Serialize};

/// Node type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Root = 0,
    Element = 1,
    Text = 2,
    Comment = 3,
    SimpleExpression = 4,
    Interpolation = 5,
    Attribute = 6,
    Directive = 7,
    CompoundExpression = 8,
    If = 9,
    IfBranch = 10,
    For = 11,
    TextCall = 12,
    Hoisted = 13,
    // Generated code
    VNodeCall = 14,
    JsCallExpression = 15,
    JsObjectExpression = 16,
    JsProperty = 17,
    JsArrayExpression = 18,
    JsFunctionExpression = 19,
    JsConditionalExpression = 20,
    JsCacheExpression = 21,
    JsBlockStatement = 22,
    JsTemplateLiteral = 23,
    JsIfStatement = 24,
    JsAssignmentExpression = 25,
    JsSequenceExpression = 26,
    JsReturnStatement = 27,
}

/// Element type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum ElementType {
    #[default]
    Element = 0,
    Component = 1,
    Slot = 2,
    Template = 3,
}

/// Namespace for elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum Namespace {
    #[default]
    Html = 0,
    Svg = 1,
    MathMl = 2,
}

/// How invariant an expression is across renders.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[repr(u8)]
pub enum ConstantType {
    #[default]
    NotConstant = 0,
    CanSkipPatch = 1,
    CanCache = 2,
    CanStringify = 3,
}

/// Source position in the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    /// Byte offset from start of file
    pub offset: u32,
    /// 1-indexed line number
    pub line: u32,
    /// 1-indexed column number
    pub column: u32,
}

impl Position {
    pub const fn new(offset: u32, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

/// Source location span [start, end)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
    pub source: String,
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::STUB
    }
}

static STUB_LOCATION: SourceLocation = SourceLocation::STUB;

impl SourceLocation {
    /// Zero-width span for nodes with no source origin
    pub const STUB: Self = Self {
        start: Position::new(0, 1, 1),
        end: Position::new(0, 1, 1),
        source: String::const_new(""),
    };

    pub fn new(start: Position, end: Position, source: impl Into<String>) -> Self {
        Self {
            start,
            end,
            source: source.into(),
        }
    }

    pub fn is_stub(&self) -> bool {
        self.start.offset == 0 && self.end.offset == 0 && self.source.is_empty()
    }

    /// Whether `other` lies within this span. Synthetic spans are contained anywhere.
    pub fn contains(&self, other: &SourceLocation) -> bool {
        other.is_stub()
            || (other.start.offset >= self.start.offset && other.end.offset <= self.end.offset)
    }

    /// Span running from the start of `first` to the end of `last`.
    pub fn join(first: &SourceLocation, last: &SourceLocation, source: impl Into<String>) -> Self {
        Self {
            start: first.start,
            end: last.end,
            source: source.into(),
        }
    }
}

// ============================================================================
// Root
// ============================================================================

/// Root AST node
#[derive(Debug)]
pub struct RootNode<'a> {
    pub children: Vec<'a, TemplateChildNode<'a>>,
    pub helpers: Vec<'a, RuntimeHelper>,
    pub components: Vec<'a, String>,
    pub directives: Vec<'a, String>,
    pub hoists: Vec<'a, Option<JsChildNode<'a>>>,
    pub imports: Vec<'a, ImportItem>,
    /// Top-level identifiers the template reads (never names bound by a scope)
    pub references: Vec<'a, String>,
    pub cached: u32,
    pub temps: u32,
    pub source: String,
    pub loc: SourceLocation,
    pub codegen_node: Option<JsChildNode<'a>>,
    pub transformed: bool,
}

impl<'a> RootNode<'a> {
    pub fn new(allocator: &'a Bump, source: impl Into<String>) -> Self {
        Self {
            children: Vec::new_in(allocator),
            helpers: Vec::new_in(allocator),
            components: Vec::new_in(allocator),
            directives: Vec::new_in(allocator),
            hoists: Vec::new_in(allocator),
            imports: Vec::new_in(allocator),
            references: Vec::new_in(allocator),
            cached: 0,
            temps: 0,
            source: source.into(),
            loc: SourceLocation::STUB,
            codegen_node: None,
            transformed: false,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Root
    }
}

/// Import emitted ahead of a module-mode render function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportItem {
    /// Local binding name
    pub exp: String,
    /// Module specifier
    pub path: String,
}

// ============================================================================
// Runtime helpers
// ============================================================================

/// Runtime helper symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum RuntimeHelper {
    Fragment,
    Teleport,
    Suspense,
    KeepAlive,
    BaseTransition,
    Transition,
    TransitionGroup,
    OpenBlock,
    CreateBlock,
    CreateElementBlock,
    CreateVNode,
    CreateElementVNode,
    CreateComment,
    CreateText,
    ResolveComponent,
    ResolveDynamicComponent,
    ResolveDirective,
    WithDirectives,
    RenderList,
    RenderSlot,
    CreateSlots,
    ToDisplayString,
    MergeProps,
    NormalizeClass,
    NormalizeStyle,
    NormalizeProps,
    GuardReactiveProps,
    ToHandlers,
    Camelize,
    Capitalize,
    ToHandlerKey,
    SetBlockTracking,
    WithCtx,
    WithMemo,
    IsMemoSame,
    VShow,
    VModelText,
    VModelCheckbox,
    VModelRadio,
    VModelSelect,
    VModelDynamic,
    WithModifiers,
    WithKeys,
}

impl RuntimeHelper {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fragment => "Fragment",
            Self::Teleport => "Teleport",
            Self::Suspense => "Suspense",
            Self::KeepAlive => "KeepAlive",
            Self::BaseTransition => "BaseTransition",
            Self::Transition => "Transition",
            Self::TransitionGroup => "TransitionGroup",
            Self::OpenBlock => "openBlock",
            Self::CreateBlock => "createBlock",
            Self::CreateElementBlock => "createElementBlock",
            Self::CreateVNode => "createVNode",
            Self::CreateElementVNode => "createElementVNode",
            Self::CreateComment => "createCommentVNode",
            Self::CreateText => "createTextVNode",
            Self::ResolveComponent => "resolveComponent",
            Self::ResolveDynamicComponent => "resolveDynamicComponent",
            Self::ResolveDirective => "resolveDirective",
            Self::WithDirectives => "withDirectives",
            Self::RenderList => "renderList",
            Self::RenderSlot => "renderSlot",
            Self::CreateSlots => "createSlots",
            Self::ToDisplayString => "toDisplayString",
            Self::MergeProps => "mergeProps",
            Self::NormalizeClass => "normalizeClass",
            Self::NormalizeStyle => "normalizeStyle",
            Self::NormalizeProps => "normalizeProps",
            Self::GuardReactiveProps => "guardReactiveProps",
            Self::ToHandlers => "toHandlers",
            Self::Camelize => "camelize",
            Self::Capitalize => "capitalize",
            Self::ToHandlerKey => "toHandlerKey",
            Self::SetBlockTracking => "setBlockTracking",
            Self::WithCtx => "withCtx",
            Self::WithMemo => "withMemo",
            Self::IsMemoSame => "isMemoSame",
            Self::VShow => "vShow",
            Self::VModelText => "vModelText",
            Self::VModelCheckbox => "vModelCheckbox",
            Self::VModelRadio => "vModelRadio",
            Self::VModelSelect => "vModelSelect",
            Self::VModelDynamic => "vModelDynamic",
            Self::WithModifiers => "withModifiers",
            Self::WithKeys => "withKeys",
        }
    }

    /// Helper creating a plain vnode
    pub fn vnode(is_component: bool) -> Self {
        if is_component {
            Self::CreateVNode
        } else {
            Self::CreateElementVNode
        }
    }

    /// Helper creating a block vnode
    pub fn block(is_component: bool) -> Self {
        if is_component {
            Self::CreateBlock
        } else {
            Self::CreateElementBlock
        }
    }
}

// ============================================================================
// Template Nodes
// ============================================================================

/// All template child node types
#[derive(Debug)]
pub enum TemplateChildNode<'a> {
    Element(Box<'a, ElementNode<'a>>),
    Text(Box<'a, TextNode>),
    Comment(Box<'a, CommentNode>),
    Interpolation(Box<'a, InterpolationNode<'a>>),
    If(Box<'a, IfNode<'a>>),
    For(Box<'a, ForNode<'a>>),
    TextCall(Box<'a, TextCallNode<'a>>),
    CompoundExpression(Box<'a, CompoundExpressionNode<'a>>),
    /// Static reference to `root.hoists[index]`
    Hoisted(usize),
}

impl<'a> TemplateChildNode<'a> {
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Element(_) => NodeType::Element,
            Self::Text(_) => NodeType::Text,
            Self::Comment(_) => NodeType::Comment,
            Self::Interpolation(_) => NodeType::Interpolation,
            Self::If(_) => NodeType::If,
            Self::For(_) => NodeType::For,
            Self::TextCall(_) => NodeType::TextCall,
            Self::CompoundExpression(_) => NodeType::CompoundExpression,
            Self::Hoisted(_) => NodeType::Hoisted,
        }
    }

    pub fn loc(&self) -> &SourceLocation {
        match self {
            Self::Element(n) => &n.loc,
            Self::Text(n) => &n.loc,
            Self::Comment(n) => &n.loc,
            Self::Interpolation(n) => &n.loc,
            Self::If(n) => &n.loc,
            Self::For(n) => &n.loc,
            Self::TextCall(n) => &n.loc,
            Self::CompoundExpression(n) => &n.loc,
            Self::Hoisted(_) => &STUB_LOCATION,
        }
    }

    /// Text, interpolation, or an already merged run of them.
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            Self::Text(_) | Self::Interpolation(_) | Self::CompoundExpression(_)
        )
    }

    /// Whitespace-only text
    pub fn is_whitespace_text(&self) -> bool {
        matches!(self, Self::Text(t) if t.content.trim().is_empty())
    }
}

/// Element node
#[derive(Debug)]
pub struct ElementNode<'a> {
    pub ns: Namespace,
    pub tag: String,
    pub tag_type: ElementType,
    pub props: Vec<'a, PropNode<'a>>,
    pub children: Vec<'a, TemplateChildNode<'a>>,
    pub is_self_closing: bool,
    pub loc: SourceLocation,
    pub codegen_node: Option<ElementCodegenNode<'a>>,
    /// Output of directive transforms, one entry per transformed directive
    pub directive_results: Vec<'a, TransformedDirective<'a>>,
}

impl<'a> ElementNode<'a> {
    pub fn new(allocator: &'a Bump, tag: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            ns: Namespace::Html,
            tag: tag.into(),
            tag_type: ElementType::Element,
            props: Vec::new_in(allocator),
            children: Vec::new_in(allocator),
            is_self_closing: false,
            loc,
            codegen_node: None,
            directive_results: Vec::new_in(allocator),
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Element
    }

    /// Index of the directive named `name`
    pub fn find_dir_index(&self, name: &str) -> Option<usize> {
        self.props
            .iter()
            .position(|p| matches!(p, PropNode::Directive(d) if d.name == name))
    }

    pub fn find_dir(&self, name: &str) -> Option<&DirectiveNode<'a>> {
        self.props.iter().find_map(|p| match p {
            PropNode::Directive(d) if d.name == name => Some(&**d),
            _ => None,
        })
    }

    pub fn has_dir(&self, name: &str) -> bool {
        self.find_dir_index(name).is_some()
    }

    /// Static attribute `name`, or `v-bind` with static argument `name` when `dynamic`.
    pub fn find_prop(&self, name: &str, dynamic: bool) -> Option<&PropNode<'a>> {
        self.props.iter().find(|p| match p {
            PropNode::Attribute(a) => a.name == name,
            PropNode::Directive(d) => {
                dynamic && d.name == "bind" && d.static_arg() == Some(name)
            }
        })
    }

    /// Remove and return the prop at `index`.
    pub fn remove_prop(&mut self, index: usize) -> PropNode<'a> {
        self.props.remove(index)
    }

    pub fn is_component(&self) -> bool {
        self.tag_type == ElementType::Component
    }
}

/// What the directive transforms produced for one directive of an element.
#[derive(Debug)]
pub struct TransformedDirective<'a> {
    /// Index of the directive in `ElementNode::props`
    pub prop_index: usize,
    pub props: Vec<'a, Property<'a>>,
    pub runtime: Option<DirectiveArgumentNode<'a>>,
}

/// Element codegen node
#[derive(Debug)]
pub enum ElementCodegenNode<'a> {
    VNodeCall(Box<'a, VNodeCall<'a>>),
    SimpleExpression(Box<'a, SimpleExpressionNode<'a>>),
    Cache(Box<'a, CacheExpression<'a>>),
    Call(Box<'a, CallExpression<'a>>),
}

impl<'a> ElementCodegenNode<'a> {
    pub fn as_vnode_call(&self) -> Option<&VNodeCall<'a>> {
        match self {
            Self::VNodeCall(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vnode_call_mut(&mut self) -> Option<&mut VNodeCall<'a>> {
        match self {
            Self::VNodeCall(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_js_child(self) -> JsChildNode<'a> {
        match self {
            Self::VNodeCall(v) => JsChildNode::VNodeCall(v),
            Self::SimpleExpression(s) => JsChildNode::SimpleExpression(s),
            Self::Cache(c) => JsChildNode::Cache(c),
            Self::Call(c) => JsChildNode::Call(c),
        }
    }
}

/// Prop node (attribute or directive)
#[derive(Debug)]
pub enum PropNode<'a> {
    Attribute(Box<'a, AttributeNode>),
    Directive(Box<'a, DirectiveNode<'a>>),
}

impl<'a> PropNode<'a> {
    pub fn loc(&self) -> &SourceLocation {
        match self {
            Self::Attribute(n) => &n.loc,
            Self::Directive(n) => &n.loc,
        }
    }
}

/// Attribute node
#[derive(Debug)]
pub struct AttributeNode {
    pub name: String,
    pub name_loc: SourceLocation,
    pub value: Option<TextNode>,
    pub loc: SourceLocation,
}

impl AttributeNode {
    pub fn new(name: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            name: name.into(),
            name_loc: loc.clone(),
            value: None,
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Attribute
    }
}

/// Directive node (v-if, v-for, v-bind, ...)
#[derive(Debug)]
pub struct DirectiveNode<'a> {
    /// Normalized name without prefix (`if`, `for`, `bind`)
    pub name: String,
    /// Raw attribute name including shorthand (`@click`, `:class`)
    pub raw_name: Option<String>,
    pub exp: Option<ExpressionNode<'a>>,
    /// Argument (`click` in `@click`)
    pub arg: Option<ExpressionNode<'a>>,
    pub modifiers: Vec<'a, String>,
    /// Parsed alias structure for `v-for`
    pub for_parse_result: Option<ForParseResult<'a>>,
    pub loc: SourceLocation,
}

impl<'a> DirectiveNode<'a> {
    pub fn new(allocator: &'a Bump, name: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            name: name.into(),
            raw_name: None,
            exp: None,
            arg: None,
            modifiers: Vec::new_in(allocator),
            for_parse_result: None,
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Directive
    }

    /// Argument text when it is static
    pub fn static_arg(&self) -> Option<&str> {
        match &self.arg {
            Some(ExpressionNode::Simple(s)) if s.is_static => Some(s.content.as_str()),
            _ => None,
        }
    }

    /// Expression text, `None` when absent or blank
    pub fn exp_content(&self) -> Option<&str> {
        match &self.exp {
            Some(ExpressionNode::Simple(s)) if !s.content.trim().is_empty() => {
                Some(s.content.as_str())
            }
            _ => None,
        }
    }

    pub fn has_modifier(&self, name: &str) -> bool {
        self.modifiers.iter().any(|m| m == name)
    }
}

/// Text node
#[derive(Debug, Clone)]
pub struct TextNode {
    pub content: String,
    pub loc: SourceLocation,
}

impl TextNode {
    pub fn new(content: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            content: content.into(),
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Text
    }
}

/// Comment node
#[derive(Debug)]
pub struct CommentNode {
    pub content: String,
    pub loc: SourceLocation,
}

impl CommentNode {
    pub fn new(content: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            content: content.into(),
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Comment
    }
}

/// Interpolation node (`{{ expr }}`)
#[derive(Debug)]
pub struct InterpolationNode<'a> {
    pub content: ExpressionNode<'a>,
    pub loc: SourceLocation,
}

impl<'a> InterpolationNode<'a> {
    pub fn node_type(&self) -> NodeType {
        NodeType::Interpolation
    }
}

// ============================================================================
// Expression Nodes
// ============================================================================

/// Expression node types
#[derive(Debug)]
pub enum ExpressionNode<'a> {
    Simple(Box<'a, SimpleExpressionNode<'a>>),
    Compound(Box<'a, CompoundExpressionNode<'a>>),
}

impl<'a> ExpressionNode<'a> {
    pub fn simple(allocator: &'a Bump, node: SimpleExpressionNode<'a>) -> Self {
        Self::Simple(Box::new_in(node, allocator))
    }

    pub fn loc(&self) -> &SourceLocation {
        match self {
            Self::Simple(n) => &n.loc,
            Self::Compound(n) => &n.loc,
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleExpressionNode<'a>> {
        match self {
            Self::Simple(s) => Some(s),
            Self::Compound(_) => None,
        }
    }

    pub fn as_simple_mut(&mut self) -> Option<&mut SimpleExpressionNode<'a>> {
        match self {
            Self::Simple(s) => Some(s),
            Self::Compound(_) => None,
        }
    }

    /// Deep copy into the same arena
    pub fn clone_in(&self, allocator: &'a Bump) -> Self {
        match self {
            Self::Simple(s) => Self::Simple(Box::new_in((**s).clone(), allocator)),
            Self::Compound(c) => Self::Compound(Box::new_in(c.clone_in(allocator), allocator)),
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Self::Simple(s) if s.is_static)
    }

    pub fn const_type(&self) -> ConstantType {
        match self {
            Self::Simple(s) => s.const_type,
            Self::Compound(c) => c.const_type(),
        }
    }

    /// Locally-bound names this expression reads
    pub fn scoped_identifiers(&self) -> &[String] {
        let ids = match self {
            Self::Simple(s) => &s.identifiers,
            Self::Compound(c) => &c.identifiers,
        };
        ids.as_deref().unwrap_or(&[])
    }
}

/// Simple expression node
#[derive(Debug, Clone)]
pub struct SimpleExpressionNode<'a> {
    pub content: String,
    /// A literal string rather than code (rendered quoted)
    pub is_static: bool,
    pub const_type: ConstantType,
    pub loc: SourceLocation,
    /// Index into `root.hoists` this expression stands for
    pub hoisted: Option<usize>,
    /// Scope-bound identifiers referenced by this expression
    pub identifiers: Option<Vec<'a, String>>,
    pub is_handler_key: bool,
}

impl<'a> SimpleExpressionNode<'a> {
    pub fn new(content: impl Into<String>, is_static: bool, loc: SourceLocation) -> Self {
        Self {
            content: content.into(),
            is_static,
            const_type: if is_static {
                ConstantType::CanStringify
            } else {
                ConstantType::NotConstant
            },
            loc,
            hoisted: None,
            identifiers: None,
            is_handler_key: false,
        }
    }

    /// Code fragment with a fixed constness (generated, not parsed).
    pub fn code(content: impl Into<String>, const_type: ConstantType) -> Self {
        let mut node = Self::new(content, false, SourceLocation::STUB);
        node.const_type = const_type;
        node
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::SimpleExpression
    }

    /// Value provably invariant across renders
    pub fn is_constant(&self) -> bool {
        self.const_type > ConstantType::NotConstant
    }
}

/// Compound expression node (mixed content)
#[derive(Debug)]
pub struct CompoundExpressionNode<'a> {
    pub children: Vec<'a, CompoundExpressionChild<'a>>,
    pub loc: SourceLocation,
    pub identifiers: Option<Vec<'a, String>>,
    pub is_handler_key: bool,
}

impl<'a> CompoundExpressionNode<'a> {
    pub fn new(allocator: &'a Bump, loc: SourceLocation) -> Self {
        Self {
            children: Vec::new_in(allocator),
            loc,
            identifiers: None,
            is_handler_key: false,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::CompoundExpression
    }

    /// Deep copy into the same arena
    pub fn clone_in(&self, allocator: &'a Bump) -> Self {
        let mut children = Vec::with_capacity_in(self.children.len(), allocator);
        for child in self.children.iter() {
            children.push(match child {
                CompoundExpressionChild::Simple(s) => {
                    CompoundExpressionChild::Simple(Box::new_in((**s).clone(), allocator))
                }
                CompoundExpressionChild::Compound(c) => {
                    CompoundExpressionChild::Compound(Box::new_in(c.clone_in(allocator), allocator))
                }
                CompoundExpressionChild::Interpolation(i) => {
                    CompoundExpressionChild::Interpolation(Box::new_in(
                        InterpolationNode {
                            content: i.content.clone_in(allocator),
                            loc: i.loc.clone(),
                        },
                        allocator,
                    ))
                }
                CompoundExpressionChild::Text(t) => {
                    CompoundExpressionChild::Text(Box::new_in((**t).clone(), allocator))
                }
                CompoundExpressionChild::String(s) => CompoundExpressionChild::String(s.clone()),
                CompoundExpressionChild::Symbol(h) => CompoundExpressionChild::Symbol(*h),
            });
        }
        Self {
            children,
            loc: self.loc.clone(),
            identifiers: self.identifiers.clone(),
            is_handler_key: self.is_handler_key,
        }
    }

    /// Lowest constness of any expression part; literal parts are stringifiable.
    pub fn const_type(&self) -> ConstantType {
        let mut lowest = ConstantType::CanStringify;
        for child in self.children.iter() {
            let ty = match child {
                CompoundExpressionChild::Simple(s) => s.const_type,
                CompoundExpressionChild::Compound(c) => c.const_type(),
                CompoundExpressionChild::Interpolation(i) => i.content.const_type(),
                CompoundExpressionChild::Text(_)
                | CompoundExpressionChild::String(_)
                | CompoundExpressionChild::Symbol(_) => ConstantType::CanStringify,
            };
            if ty < lowest {
                lowest = ty;
            }
        }
        lowest
    }
}

/// Child of a compound expression
#[derive(Debug)]
pub enum CompoundExpressionChild<'a> {
    Simple(Box<'a, SimpleExpressionNode<'a>>),
    Compound(Box<'a, CompoundExpressionNode<'a>>),
    Interpolation(Box<'a, InterpolationNode<'a>>),
    Text(Box<'a, TextNode>),
    /// Raw code emitted verbatim
    String(String),
    Symbol(RuntimeHelper),
}

// ============================================================================
// Control Flow Nodes
// ============================================================================

/// If node (`v-if` chain)
#[derive(Debug)]
pub struct IfNode<'a> {
    pub branches: Vec<'a, IfBranchNode<'a>>,
    pub loc: SourceLocation,
    pub codegen_node: Option<IfCodegenNode<'a>>,
}

impl<'a> IfNode<'a> {
    pub fn new(allocator: &'a Bump, loc: SourceLocation) -> Self {
        Self {
            branches: Vec::new_in(allocator),
            loc,
            codegen_node: None,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::If
    }

    /// Whether the chain already ends in an unconditional branch
    pub fn has_else(&self) -> bool {
        self.branches.last().is_some_and(|b| b.condition.is_none())
    }
}

/// If codegen node type
#[derive(Debug)]
pub enum IfCodegenNode<'a> {
    Conditional(Box<'a, ConditionalExpression<'a>>),
    Cache(Box<'a, CacheExpression<'a>>),
}

/// One branch of an if chain (`v-if`, `v-else-if`, `v-else`)
#[derive(Debug)]
pub struct IfBranchNode<'a> {
    /// `None` for the final else branch
    pub condition: Option<ExpressionNode<'a>>,
    pub children: Vec<'a, TemplateChildNode<'a>>,
    pub is_template_if: bool,
    /// Key written by the user on the branch element, as source text
    pub user_key: Option<String>,
    pub loc: SourceLocation,
}

impl<'a> IfBranchNode<'a> {
    pub fn new(
        allocator: &'a Bump,
        condition: Option<ExpressionNode<'a>>,
        loc: SourceLocation,
    ) -> Self {
        Self {
            condition,
            children: Vec::new_in(allocator),
            is_template_if: false,
            user_key: None,
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::IfBranch
    }
}

/// For node (`v-for`)
#[derive(Debug)]
pub struct ForNode<'a> {
    pub parse_result: ForParseResult<'a>,
    pub children: Vec<'a, TemplateChildNode<'a>>,
    /// `v-memo` dependencies declared on the iterated element
    pub memo: Option<ExpressionNode<'a>>,
    pub loc: SourceLocation,
    pub codegen_node: Option<ForCodegenNode<'a>>,
}

impl<'a> ForNode<'a> {
    pub fn node_type(&self) -> NodeType {
        NodeType::For
    }

    pub fn source(&self) -> &ExpressionNode<'a> {
        &self.parse_result.source
    }

    pub fn value_alias(&self) -> Option<&ExpressionNode<'a>> {
        self.parse_result.value.as_ref()
    }

    pub fn key_alias(&self) -> Option<&ExpressionNode<'a>> {
        self.parse_result.key.as_ref()
    }

    pub fn index_alias(&self) -> Option<&ExpressionNode<'a>> {
        self.parse_result.index.as_ref()
    }
}

/// For codegen node type
#[derive(Debug)]
pub enum ForCodegenNode<'a> {
    VNodeCall(Box<'a, VNodeCall<'a>>),
    Cache(Box<'a, CacheExpression<'a>>),
}

/// Parsed `v-for` expression: `(value, key, index) in source`
#[derive(Debug)]
pub struct ForParseResult<'a> {
    pub source: ExpressionNode<'a>,
    pub value: Option<ExpressionNode<'a>>,
    pub key: Option<ExpressionNode<'a>>,
    pub index: Option<ExpressionNode<'a>>,
    /// Set once the alias expressions went through expression analysis
    pub finalized: bool,
}

impl<'a> ForParseResult<'a> {
    /// Alias sources in parameter order; skipped positions are `None`.
    pub fn alias_params(&self) -> [Option<&str>; 3] {
        fn text<'b>(e: &'b Option<ExpressionNode<'_>>) -> Option<&'b str> {
            match e {
                Some(ExpressionNode::Simple(s)) => Some(s.content.as_str()),
                _ => None,
            }
        }
        [text(&self.value), text(&self.key), text(&self.index)]
    }
}

/// Merged run of adjacent text and interpolations
#[derive(Debug)]
pub struct TextCallNode<'a> {
    pub content: TextCallContent<'a>,
    pub loc: SourceLocation,
    pub codegen_node: Option<TextCallCodegenNode>,
}

impl<'a> TextCallNode<'a> {
    pub fn node_type(&self) -> NodeType {
        NodeType::TextCall
    }
}

/// Text call content
#[derive(Debug)]
pub enum TextCallContent<'a> {
    Text(Box<'a, TextNode>),
    Interpolation(Box<'a, InterpolationNode<'a>>),
    Compound(Box<'a, CompoundExpressionNode<'a>>),
}

/// How a text call is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCallCodegenNode {
    /// `createTextVNode(content[, flag])`
    CreateText { patch_flag: Option<PatchFlags> },
    /// The content expression itself
    Inline,
}

// ============================================================================
// VNode call
// ============================================================================

/// VNode creation call
#[derive(Debug)]
pub struct VNodeCall<'a> {
    pub tag: VNodeTag<'a>,
    pub props: Option<PropsExpression<'a>>,
    pub children: Option<VNodeChildren<'a>>,
    pub patch_flag: Option<PatchFlags>,
    pub dynamic_props: Option<Vec<'a, String>>,
    pub directives: Option<Vec<'a, DirectiveArgumentNode<'a>>>,
    pub is_block: bool,
    pub disable_tracking: bool,
    pub is_component: bool,
    /// Built once outside the render function
    pub hoisted: bool,
    pub loc: SourceLocation,
}

impl<'a> VNodeCall<'a> {
    pub fn new(tag: VNodeTag<'a>, loc: SourceLocation) -> Self {
        Self {
            tag,
            props: None,
            children: None,
            patch_flag: None,
            dynamic_props: None,
            directives: None,
            is_block: false,
            disable_tracking: false,
            is_component: false,
            hoisted: false,
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::VNodeCall
    }
}

/// VNode tag
#[derive(Debug)]
pub enum VNodeTag<'a> {
    /// Native tag, rendered as a string literal
    Element(String),
    /// Resolved asset identifier (`_component_foo`)
    Asset(String),
    Symbol(RuntimeHelper),
    Call(Box<'a, CallExpression<'a>>),
}

/// VNode children
#[derive(Debug)]
pub enum VNodeChildren<'a> {
    Multiple(Vec<'a, TemplateChildNode<'a>>),
    /// A single text-like child
    Single(TemplateChildNode<'a>),
    Slots(Box<'a, ObjectExpression<'a>>),
    /// `createSlots(base, [conditional and looped slots])`
    DynamicSlots(Box<'a, CallExpression<'a>>),
    ForRenderList(Box<'a, CallExpression<'a>>),
    Simple(Box<'a, SimpleExpressionNode<'a>>),
}

/// Props expression
#[derive(Debug)]
pub enum PropsExpression<'a> {
    Object(Box<'a, ObjectExpression<'a>>),
    Call(Box<'a, CallExpression<'a>>),
    Simple(Box<'a, SimpleExpressionNode<'a>>),
}

/// Runtime directive applied with `withDirectives`
#[derive(Debug)]
pub struct DirectiveArgumentNode<'a> {
    pub directive: RuntimeDirective,
    pub exp: Option<ExpressionNode<'a>>,
    pub arg: Option<ExpressionNode<'a>>,
    pub modifiers: Vec<'a, String>,
    pub loc: SourceLocation,
}

/// Where a runtime directive comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeDirective {
    /// Built-in runtime directive (`vShow`, `vModelText`)
    Helper(RuntimeHelper),
    /// User directive resolved at runtime; holds its asset identifier
    Resolved(String),
}

// ============================================================================
// Generated-code nodes
// ============================================================================

/// All generated-code expression nodes
#[derive(Debug)]
pub enum JsChildNode<'a> {
    VNodeCall(Box<'a, VNodeCall<'a>>),
    Call(Box<'a, CallExpression<'a>>),
    Object(Box<'a, ObjectExpression<'a>>),
    Array(Box<'a, ArrayExpression<'a>>),
    Function(Box<'a, FunctionExpression<'a>>),
    Conditional(Box<'a, ConditionalExpression<'a>>),
    Cache(Box<'a, CacheExpression<'a>>),
    Assignment(Box<'a, AssignmentExpression<'a>>),
    Sequence(Box<'a, SequenceExpression<'a>>),
    TemplateLiteral(Box<'a, TemplateLiteral<'a>>),
    SimpleExpression(Box<'a, SimpleExpressionNode<'a>>),
    CompoundExpression(Box<'a, CompoundExpressionNode<'a>>),
    /// A lowered template node rendered through its own codegen node
    TemplateChild(TemplateChildNode<'a>),
}

impl<'a> JsChildNode<'a> {
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::VNodeCall(_) => NodeType::VNodeCall,
            Self::Call(_) => NodeType::JsCallExpression,
            Self::Object(_) => NodeType::JsObjectExpression,
            Self::Array(_) => NodeType::JsArrayExpression,
            Self::Function(_) => NodeType::JsFunctionExpression,
            Self::Conditional(_) => NodeType::JsConditionalExpression,
            Self::Cache(_) => NodeType::JsCacheExpression,
            Self::Assignment(_) => NodeType::JsAssignmentExpression,
            Self::Sequence(_) => NodeType::JsSequenceExpression,
            Self::TemplateLiteral(_) => NodeType::JsTemplateLiteral,
            Self::SimpleExpression(_) => NodeType::SimpleExpression,
            Self::CompoundExpression(_) => NodeType::CompoundExpression,
            Self::TemplateChild(c) => c.node_type(),
        }
    }

    /// Raw code with the given constness
    pub fn code(allocator: &'a Bump, content: impl Into<String>, const_type: ConstantType) -> Self {
        Self::SimpleExpression(Box::new_in(
            SimpleExpressionNode::code(content, const_type),
            allocator,
        ))
    }

    /// Quoted string literal
    pub fn string(allocator: &'a Bump, content: impl Into<String>) -> Self {
        Self::SimpleExpression(Box::new_in(
            SimpleExpressionNode::new(content, true, SourceLocation::STUB),
            allocator,
        ))
    }

    pub fn from_expression(exp: ExpressionNode<'a>) -> Self {
        match exp {
            ExpressionNode::Simple(s) => Self::SimpleExpression(s),
            ExpressionNode::Compound(c) => Self::CompoundExpression(c),
        }
    }
}

/// Call expression
#[derive(Debug)]
pub struct CallExpression<'a> {
    pub callee: Callee,
    pub arguments: Vec<'a, CallArgument<'a>>,
    pub loc: SourceLocation,
}

impl<'a> CallExpression<'a> {
    pub fn new(allocator: &'a Bump, callee: Callee, loc: SourceLocation) -> Self {
        Self {
            callee,
            arguments: Vec::new_in(allocator),
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::JsCallExpression
    }
}

/// Callee
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callee {
    Symbol(RuntimeHelper),
    Raw(String),
}

/// Call argument
#[derive(Debug)]
pub enum CallArgument<'a> {
    /// Raw code emitted verbatim
    Raw(String),
    Symbol(RuntimeHelper),
    Node(JsChildNode<'a>),
    /// Rendered as an array of children
    Children(Vec<'a, TemplateChildNode<'a>>),
}

/// Object expression
#[derive(Debug)]
pub struct ObjectExpression<'a> {
    pub properties: Vec<'a, Property<'a>>,
    pub loc: SourceLocation,
}

impl<'a> ObjectExpression<'a> {
    pub fn new(allocator: &'a Bump, loc: SourceLocation) -> Self {
        Self {
            properties: Vec::new_in(allocator),
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::JsObjectExpression
    }
}

/// Object property
#[derive(Debug)]
pub struct Property<'a> {
    pub key: ExpressionNode<'a>,
    pub value: JsChildNode<'a>,
    pub loc: SourceLocation,
}

impl<'a> Property<'a> {
    pub fn node_type(&self) -> NodeType {
        NodeType::JsProperty
    }

    /// Static key text
    pub fn static_key(&self) -> Option<&str> {
        match &self.key {
            ExpressionNode::Simple(s) if s.is_static => Some(s.content.as_str()),
            _ => None,
        }
    }
}

/// Array expression
#[derive(Debug)]
pub struct ArrayExpression<'a> {
    pub elements: Vec<'a, JsChildNode<'a>>,
    pub loc: SourceLocation,
}

impl<'a> ArrayExpression<'a> {
    pub fn new(allocator: &'a Bump, loc: SourceLocation) -> Self {
        Self {
            elements: Vec::new_in(allocator),
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::JsArrayExpression
    }
}

/// Function expression, rendered as an arrow function
#[derive(Debug)]
pub struct FunctionExpression<'a> {
    pub params: Vec<'a, String>,
    pub returns: Option<FunctionReturns<'a>>,
    pub body: Option<FunctionBody<'a>>,
    /// Break the return value onto its own line
    pub newline: bool,
    /// Slot function; wrapped in `withCtx`
    pub is_slot: bool,
    pub loc: SourceLocation,
}

impl<'a> FunctionExpression<'a> {
    pub fn new(allocator: &'a Bump, loc: SourceLocation) -> Self {
        Self {
            params: Vec::new_in(allocator),
            returns: None,
            body: None,
            newline: false,
            is_slot: false,
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::JsFunctionExpression
    }
}

/// Function returns
#[derive(Debug)]
pub enum FunctionReturns<'a> {
    Single(TemplateChildNode<'a>),
    Multiple(Vec<'a, TemplateChildNode<'a>>),
    JsChild(JsChildNode<'a>),
}

/// Function body
#[derive(Debug)]
pub enum FunctionBody<'a> {
    Block(Box<'a, BlockStatement<'a>>),
    If(Box<'a, IfStatement<'a>>),
}

/// Conditional expression (ternary)
#[derive(Debug)]
pub struct ConditionalExpression<'a> {
    pub test: JsChildNode<'a>,
    pub consequent: JsChildNode<'a>,
    pub alternate: JsChildNode<'a>,
    pub newline: bool,
    pub loc: SourceLocation,
}

impl<'a> ConditionalExpression<'a> {
    pub fn node_type(&self) -> NodeType {
        NodeType::JsConditionalExpression
    }
}

/// Cache expression
#[derive(Debug)]
pub struct CacheExpression<'a> {
    pub index: u32,
    pub value: JsChildNode<'a>,
    /// Cached value is a vnode; creation pauses block tracking
    pub is_vnode: bool,
    pub in_v_once: bool,
    pub loc: SourceLocation,
}

impl<'a> CacheExpression<'a> {
    pub fn node_type(&self) -> NodeType {
        NodeType::JsCacheExpression
    }
}

/// Block statement
#[derive(Debug)]
pub struct BlockStatement<'a> {
    pub body: Vec<'a, Statement<'a>>,
    pub loc: SourceLocation,
}

impl<'a> BlockStatement<'a> {
    pub fn new(allocator: &'a Bump, loc: SourceLocation) -> Self {
        Self {
            body: Vec::new_in(allocator),
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::JsBlockStatement
    }
}

/// Statement inside a block
#[derive(Debug)]
pub enum Statement<'a> {
    Expression(JsChildNode<'a>),
    If(Box<'a, IfStatement<'a>>),
    Return(Box<'a, ReturnStatement<'a>>),
}

/// Template literal
#[derive(Debug)]
pub struct TemplateLiteral<'a> {
    pub elements: Vec<'a, TemplateLiteralElement<'a>>,
    pub loc: SourceLocation,
}

impl<'a> TemplateLiteral<'a> {
    pub fn node_type(&self) -> NodeType {
        NodeType::JsTemplateLiteral
    }
}

/// Template literal element
#[derive(Debug)]
pub enum TemplateLiteralElement<'a> {
    String(String),
    JsChild(JsChildNode<'a>),
}

/// If statement
#[derive(Debug)]
pub struct IfStatement<'a> {
    pub test: JsChildNode<'a>,
    pub consequent: Box<'a, BlockStatement<'a>>,
    pub alternate: Option<IfStatementAlternate<'a>>,
    pub loc: SourceLocation,
}

impl<'a> IfStatement<'a> {
    pub fn node_type(&self) -> NodeType {
        NodeType::JsIfStatement
    }
}

/// If statement alternate
#[derive(Debug)]
pub enum IfStatementAlternate<'a> {
    If(Box<'a, IfStatement<'a>>),
    Block(Box<'a, BlockStatement<'a>>),
}

/// Assignment expression
#[derive(Debug)]
pub struct AssignmentExpression<'a> {
    pub left: JsChildNode<'a>,
    pub right: JsChildNode<'a>,
    pub loc: SourceLocation,
}

impl<'a> AssignmentExpression<'a> {
    pub fn node_type(&self) -> NodeType {
        NodeType::JsAssignmentExpression
    }
}

/// Sequence expression
#[derive(Debug)]
pub struct SequenceExpression<'a> {
    pub expressions: Vec<'a, JsChildNode<'a>>,
    pub loc: SourceLocation,
}

impl<'a> SequenceExpression<'a> {
    pub fn node_type(&self) -> NodeType {
        NodeType::JsSequenceExpression
    }
}

/// Return statement
#[derive(Debug)]
pub struct ReturnStatement<'a> {
    pub returns: JsChildNode<'a>,
    pub loc: SourceLocation,
}

impl<'a> ReturnStatement<'a> {
    pub fn node_type(&self) -> NodeType {
        NodeType::JsReturnStatement
    }
}

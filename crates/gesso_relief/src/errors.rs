//! Compiler diagnostics and fatal errors.
//!
//! Three tiers: [`CompilerError`] diagnostics accumulate and never stop a
//! compilation, [`InternalError`] faults abort the phase that raised them,
//! and [`ConfigError`]s are returned before any work starts.

use crate::ast::{NodeType, SourceLocation};
use gesso_carton::String;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum ErrorCode {
    // Parse errors
    AbruptClosingOfEmptyComment = 0,
    DuplicateAttribute = 1,
    EndTagWithAttributes = 2,
    EofBeforeTagName = 3,
    EofInComment = 4,
    EofInTag = 5,
    IncorrectlyClosedComment = 6,
    InvalidFirstCharacterOfTagName = 7,
    MissingAttributeValue = 8,
    MissingEndTagName = 9,
    UnexpectedCharacterInAttributeName = 10,
    UnexpectedEqualsSignBeforeAttributeName = 11,
    UnexpectedSolidusInTag = 12,
    InvalidEndTag = 13,
    MissingEndTag = 14,
    MissingInterpolationEnd = 15,
    MissingDirectiveName = 16,
    MissingDynamicDirectiveArgumentEnd = 17,

    // Transform errors
    VIfNoExpression = 30,
    VIfSameKey = 31,
    VElseNoAdjacentIf = 32,
    VForNoExpression = 33,
    VForMalformedExpression = 34,
    VForTemplateKeyPlacement = 35,
    VBindNoExpression = 36,
    VOnNoExpression = 37,
    VSlotUnexpectedDirectiveOnSlotOutlet = 38,
    VSlotMixedSlotUsage = 39,
    VSlotDuplicateSlotNames = 40,
    VSlotExtraneousDefaultSlotChildren = 41,
    VSlotMisplaced = 42,
    VModelNoExpression = 43,
    VModelMalformedExpression = 44,
    VModelOnScopeVariable = 45,
    InvalidExpression = 46,
    VMemoNoExpression = 47,
    VOnceInsideMemo = 48,

    // Platform errors
    VHtmlNoExpression = 60,
    VHtmlWithChildren = 61,
    VTextNoExpression = 62,
    VTextWithChildren = 63,
    VModelOnInvalidElement = 64,
    VModelArgOnElement = 65,
    VModelOnFileInputElement = 66,
    VModelUnnecessaryValue = 67,
    VShowNoExpression = 68,
}

impl ErrorCode {
    pub fn message(&self) -> &'static str {
        match self {
            Self::AbruptClosingOfEmptyComment => "Illegal comment.",
            Self::DuplicateAttribute => "Duplicate attribute.",
            Self::EndTagWithAttributes => "End tag cannot have attributes.",
            Self::EofBeforeTagName => "Unexpected EOF in tag.",
            Self::EofInComment => "Unexpected EOF in comment.",
            Self::EofInTag => "Unexpected EOF in tag.",
            Self::IncorrectlyClosedComment => "Incorrectly closed comment.",
            Self::InvalidFirstCharacterOfTagName => "Illegal tag name. Use '&lt;' to print '<'.",
            Self::MissingAttributeValue => "Attribute value was expected.",
            Self::MissingEndTagName => "End tag name was expected.",
            Self::UnexpectedCharacterInAttributeName => {
                "Attribute name cannot contain U+0022 (\"), U+0027 ('), and U+003C (<)."
            }
            Self::UnexpectedEqualsSignBeforeAttributeName => {
                "Attribute name cannot start with '='."
            }
            Self::UnexpectedSolidusInTag => "Illegal '/' in tags.",
            Self::InvalidEndTag => "Invalid end tag.",
            Self::MissingEndTag => "Element is missing end tag.",
            Self::MissingInterpolationEnd => "Interpolation end sign was not found.",
            Self::MissingDirectiveName => "Legal directive name was expected.",
            Self::MissingDynamicDirectiveArgumentEnd => {
                "End bracket for dynamic directive argument was not found."
            }
            Self::VIfNoExpression => "v-if/v-else-if is missing expression.",
            Self::VIfSameKey => "v-if/else branches must use unique keys.",
            Self::VElseNoAdjacentIf => "v-else/v-else-if has no adjacent v-if or v-else-if.",
            Self::VForNoExpression => "v-for is missing expression.",
            Self::VForMalformedExpression => "v-for has invalid expression.",
            Self::VForTemplateKeyPlacement => {
                "<template v-for> key should be placed on the <template> tag."
            }
            Self::VBindNoExpression => "v-bind is missing expression.",
            Self::VOnNoExpression => "v-on is missing expression.",
            Self::VSlotUnexpectedDirectiveOnSlotOutlet => {
                "Unexpected custom directive on <slot> outlet."
            }
            Self::VSlotMixedSlotUsage => {
                "Mixed v-slot usage on both the component and nested <template>."
            }
            Self::VSlotDuplicateSlotNames => "Duplicate slot names found.",
            Self::VSlotExtraneousDefaultSlotChildren => {
                "Extraneous children found when component already has explicitly named default slot."
            }
            Self::VSlotMisplaced => "v-slot can only be used on components or <template> tags.",
            Self::VModelNoExpression => "v-model is missing expression.",
            Self::VModelMalformedExpression => {
                "v-model value must be a valid JavaScript member expression."
            }
            Self::VModelOnScopeVariable => {
                "v-model cannot be used on v-for or v-slot scope variables because they are not writable."
            }
            Self::InvalidExpression => "Error parsing JavaScript expression.",
            Self::VMemoNoExpression => "v-memo is missing expression.",
            Self::VOnceInsideMemo => "v-once has no effect inside v-memo.",
            Self::VHtmlNoExpression => "v-html is missing expression.",
            Self::VHtmlWithChildren => "v-html will override element children.",
            Self::VTextNoExpression => "v-text is missing expression.",
            Self::VTextWithChildren => "v-text will override element children.",
            Self::VModelOnInvalidElement => {
                "v-model can only be used on <input>, <textarea> and <select> elements."
            }
            Self::VModelArgOnElement => "v-model argument is not supported on plain elements.",
            Self::VModelOnFileInputElement => {
                "v-model cannot be used on file inputs since they are read-only."
            }
            Self::VModelUnnecessaryValue => {
                "Unnecessary value binding used alongside v-model. It will interfere with v-model's behavior."
            }
            Self::VShowNoExpression => "v-show is missing expression.",
        }
    }

    /// Stable message key
    pub fn key(&self) -> &'static str {
        match self {
            Self::AbruptClosingOfEmptyComment => "abrupt-closing-of-empty-comment",
            Self::DuplicateAttribute => "duplicate-attribute",
            Self::EndTagWithAttributes => "end-tag-with-attributes",
            Self::EofBeforeTagName => "eof-before-tag-name",
            Self::EofInComment => "eof-in-comment",
            Self::EofInTag => "eof-in-tag",
            Self::IncorrectlyClosedComment => "incorrectly-closed-comment",
            Self::InvalidFirstCharacterOfTagName => "invalid-first-character-of-tag-name",
            Self::MissingAttributeValue => "missing-attribute-value",
            Self::MissingEndTagName => "missing-end-tag-name",
            Self::UnexpectedCharacterInAttributeName => "unexpected-character-in-attribute-name",
            Self::UnexpectedEqualsSignBeforeAttributeName => {
                "unexpected-equals-sign-before-attribute-name"
            }
            Self::UnexpectedSolidusInTag => "unexpected-solidus-in-tag",
            Self::InvalidEndTag => "x-invalid-end-tag",
            Self::MissingEndTag => "x-missing-end-tag",
            Self::MissingInterpolationEnd => "x-missing-interpolation-end",
            Self::MissingDirectiveName => "x-missing-directive-name",
            Self::MissingDynamicDirectiveArgumentEnd => "x-missing-dynamic-directive-argument-end",
            Self::VIfNoExpression => "x-v-if-no-expression",
            Self::VIfSameKey => "x-v-if-same-key",
            Self::VElseNoAdjacentIf => "x-v-else-no-adjacent-if",
            Self::VForNoExpression => "x-v-for-no-expression",
            Self::VForMalformedExpression => "x-v-for-malformed-expression",
            Self::VForTemplateKeyPlacement => "x-v-for-template-key-placement",
            Self::VBindNoExpression => "x-v-bind-no-expression",
            Self::VOnNoExpression => "x-v-on-no-expression",
            Self::VSlotUnexpectedDirectiveOnSlotOutlet => {
                "x-v-slot-unexpected-directive-on-slot-outlet"
            }
            Self::VSlotMixedSlotUsage => "x-v-slot-mixed-slot-usage",
            Self::VSlotDuplicateSlotNames => "x-v-slot-duplicate-slot-names",
            Self::VSlotExtraneousDefaultSlotChildren => "x-v-slot-extraneous-default-slot-children",
            Self::VSlotMisplaced => "x-v-slot-misplaced",
            Self::VModelNoExpression => "x-v-model-no-expression",
            Self::VModelMalformedExpression => "x-v-model-malformed-expression",
            Self::VModelOnScopeVariable => "x-v-model-on-scope-variable",
            Self::InvalidExpression => "x-invalid-expression",
            Self::VMemoNoExpression => "x-v-memo-no-expression",
            Self::VOnceInsideMemo => "x-v-once-inside-memo",
            Self::VHtmlNoExpression => "x-v-html-no-expression",
            Self::VHtmlWithChildren => "x-v-html-with-children",
            Self::VTextNoExpression => "x-v-text-no-expression",
            Self::VTextWithChildren => "x-v-text-with-children",
            Self::VModelOnInvalidElement => "x-v-model-on-invalid-element",
            Self::VModelArgOnElement => "x-v-model-arg-on-element",
            Self::VModelOnFileInputElement => "x-v-model-on-file-input-element",
            Self::VModelUnnecessaryValue => "x-v-model-unnecessary-value",
            Self::VShowNoExpression => "x-v-show-no-expression",
        }
    }

    pub fn is_parse_error(&self) -> bool {
        (*self as u16) < 30
    }
}

/// Recoverable diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .code.message())]
pub struct CompilerError {
    pub code: ErrorCode,
    pub loc: Option<SourceLocation>,
}

impl CompilerError {
    pub fn new(code: ErrorCode, loc: Option<SourceLocation>) -> Self {
        Self { code, loc }
    }
}

/// Broken compiler invariant. Aborts the phase that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("scope stack underflow: pop_scope called with no scope pushed")]
    ScopeUnderflow,

    #[error("{kind:?} node reached codegen without a codegen node (at offset {})", .loc.start.offset)]
    MissingCodegenNode { kind: NodeType, loc: SourceLocation },

    #[error("unexpected {kind:?} node in {context}")]
    UnexpectedNode { kind: NodeType, context: &'static str },
}

/// Invalid compiler options
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown codegen mode `{0}` (expected `module` or `function`)")]
    UnknownMode(String),

    #[error("interpolation delimiters must not be empty")]
    EmptyDelimiter,

    #[error("interpolation open and close delimiters must differ")]
    IdenticalDelimiters,

    #[error("`cache_handlers` requires `prefix_identifiers`")]
    CacheHandlersRequirePrefix,
}

/// Error returned by `compile`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("invalid options: {0}")]
    Config(#[from] ConfigError),

    #[error("template has {} parse error(s)", .0.len())]
    Parse(std::vec::Vec<CompilerError>),

    #[error("internal compiler error: {0}")]
    Internal(#[from] InternalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert!(!ErrorCode::VIfNoExpression.message().is_empty());
        assert_eq!(ErrorCode::VForNoExpression.key(), "x-v-for-no-expression");
        assert!(ErrorCode::MissingEndTag.is_parse_error());
        assert!(!ErrorCode::VShowNoExpression.is_parse_error());
    }

    #[test]
    fn test_compiler_error_display() {
        let err = CompilerError::new(ErrorCode::VOnNoExpression, None);
        assert_eq!(err.to_string(), "v-on is missing expression.");
    }

    #[test]
    fn test_compile_error_from() {
        let err: CompileError = ConfigError::EmptyDelimiter.into();
        assert!(matches!(err, CompileError::Config(_)));
        let err: CompileError = InternalError::ScopeUnderflow.into();
        assert!(err.to_string().contains("scope stack underflow"));
    }
}

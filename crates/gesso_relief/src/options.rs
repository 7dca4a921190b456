//! Compiler options.

use crate::ast::{Namespace, RuntimeHelper};
use crate::errors::ConfigError;
use gesso_carton::String;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Parser options
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Whether to trim whitespace
    pub whitespace: WhitespaceStrategy,
    /// Custom delimiters for interpolation (default: ["{{", "}}"])
    pub delimiters: (String, String),
    /// Whether in pre tag
    pub is_pre_tag: fn(&str) -> bool,
    /// Whether is a native tag; `None` treats every non-component tag as native
    pub is_native_tag: Option<fn(&str) -> bool>,
    /// Whether is a void tag
    pub is_void_tag: fn(&str) -> bool,
    /// Custom elements are parsed as plain elements even when not native
    pub is_custom_element: fn(&str) -> bool,
    /// Get the namespace for a tag given its parent's tag
    pub get_namespace: fn(&str, Option<&str>) -> Namespace,
    /// Keep comments in the AST
    pub comments: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            whitespace: WhitespaceStrategy::Condense,
            delimiters: (String::from("{{"), String::from("}}")),
            is_pre_tag: |_| false,
            is_native_tag: None,
            is_void_tag: gesso_carton::is_void_tag,
            is_custom_element: |_| false,
            get_namespace: |_, _| Namespace::Html,
            comments: true,
        }
    }
}

/// Whitespace handling strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhitespaceStrategy {
    /// Condense whitespace (default)
    #[default]
    Condense,
    /// Preserve all whitespace
    Preserve,
}

/// Transform options
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Filename for error messages
    pub filename: String,
    /// Whether to prefix identifiers
    pub prefix_identifiers: bool,
    /// Whether to hoist static nodes
    pub hoist_static: bool,
    /// Whether to cache handlers
    pub cache_handlers: bool,
    /// Built-in component lookup (`Teleport`, `KeepAlive`, ...)
    pub is_builtin_component: fn(&str) -> Option<RuntimeHelper>,
    /// Custom elements are rendered as plain elements, never resolved
    pub is_custom_element: fn(&str) -> bool,
    /// Directives compiled away; any other name is resolved at runtime
    pub is_builtin_directive: fn(&str) -> bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            filename: String::from("template.html"),
            prefix_identifiers: false,
            hoist_static: true,
            cache_handlers: false,
            is_builtin_component: core_builtin_component,
            is_custom_element: |_| false,
            is_builtin_directive: gesso_carton::is_builtin_directive,
        }
    }
}

/// Platform-agnostic built-in components
pub fn core_builtin_component(tag: &str) -> Option<RuntimeHelper> {
    match tag {
        "Teleport" | "teleport" => Some(RuntimeHelper::Teleport),
        "Suspense" | "suspense" => Some(RuntimeHelper::Suspense),
        "KeepAlive" | "keep-alive" => Some(RuntimeHelper::KeepAlive),
        "BaseTransition" | "base-transition" => Some(RuntimeHelper::BaseTransition),
        _ => None,
    }
}

/// Codegen options
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// Output mode
    pub mode: CodegenMode,
    /// Output layout
    pub style: CodegenStyle,
    /// Whether to prefix identifiers
    pub prefix_identifiers: bool,
    /// Whether to generate source map
    pub source_map: bool,
    /// Filename for source map
    pub filename: String,
    /// Runtime module name
    pub runtime_module_name: String,
    /// Runtime global name
    pub runtime_global_name: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            mode: CodegenMode::Function,
            style: CodegenStyle::Pretty,
            prefix_identifiers: false,
            source_map: false,
            filename: String::from("template.html"),
            runtime_module_name: String::from("vue"),
            runtime_global_name: String::from("Vue"),
        }
    }
}

/// Codegen output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodegenMode {
    /// Generate a function (default)
    #[default]
    Function,
    /// Generate an ES module
    Module,
}

impl FromStr for CodegenMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "function" => Ok(Self::Function),
            "module" => Ok(Self::Module),
            other => Err(ConfigError::UnknownMode(String::from(other))),
        }
    }
}

/// Codegen output layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodegenStyle {
    /// Indented, one statement per line
    #[default]
    Pretty,
    /// No indentation, statements terminated by `;`
    Compact,
}

/// Combined compiler options
#[derive(Debug, Clone, Default)]
pub struct CompilerOptions {
    pub parser: ParserOptions,
    pub transform: TransformOptions,
    pub codegen: CodegenOptions,
    /// Keep compiling past parse errors
    pub best_effort: bool,
}

impl CompilerOptions {
    /// Reject option combinations that cannot produce valid output.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (open, close) = &self.parser.delimiters;
        if open.is_empty() || close.is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }
        if open == close {
            return Err(ConfigError::IdenticalDelimiters);
        }
        if self.transform.cache_handlers && !self.transform.prefix_identifiers {
            return Err(ConfigError::CacheHandlersRequirePrefix);
        }
        Ok(())
    }

    /// Treat tags matching `is_custom_element` as plain elements in both
    /// the parser and the transform.
    pub fn with_custom_elements(mut self, is_custom_element: fn(&str) -> bool) -> Self {
        self.parser.is_custom_element = is_custom_element;
        self.transform.is_custom_element = is_custom_element;
        self
    }

    /// Options for module output with identifier prefixing
    pub fn module() -> Self {
        let mut options = Self::default();
        options.codegen.mode = CodegenMode::Module;
        options.codegen.prefix_identifiers = true;
        options.transform.prefix_identifiers = true;
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("module".parse::<CodegenMode>(), Ok(CodegenMode::Module));
        assert_eq!(
            "esm".parse::<CodegenMode>(),
            Err(ConfigError::UnknownMode(String::from("esm")))
        );
    }

    #[test]
    fn test_validate() {
        assert!(CompilerOptions::default().validate().is_ok());

        let mut options = CompilerOptions::default();
        options.parser.delimiters = (String::from("${"), String::from(""));
        assert_eq!(options.validate(), Err(ConfigError::EmptyDelimiter));

        let mut options = CompilerOptions::default();
        options.parser.delimiters = (String::from("%%"), String::from("%%"));
        assert_eq!(options.validate(), Err(ConfigError::IdenticalDelimiters));

        let mut options = CompilerOptions::default();
        options.transform.cache_handlers = true;
        assert_eq!(
            options.validate(),
            Err(ConfigError::CacheHandlersRequirePrefix)
        );
    }

    #[test]
    fn test_custom_elements_reach_both_phases() {
        let options = CompilerOptions::default().with_custom_elements(|tag| tag.starts_with("x-"));
        assert!((options.parser.is_custom_element)("x-chart"));
        assert!((options.transform.is_custom_element)("x-chart"));
        assert!(!(options.transform.is_custom_element)("div"));
        assert!((options.transform.is_builtin_directive)("show"));
    }

    #[test]
    fn test_serde_enums() {
        let style: CodegenStyle = serde_json::from_str("\"compact\"").unwrap();
        assert_eq!(style, CodegenStyle::Compact);
        assert_eq!(
            serde_json::to_string(&CodegenMode::Module).unwrap(),
            "\"module\""
        );
    }
}

//! DOM compiler options.

use gesso_relief::ast::{Namespace, RuntimeHelper};
use gesso_relief::options::{
    core_builtin_component, CodegenMode, CodegenStyle, CompilerOptions, ParserOptions,
    TransformOptions, WhitespaceStrategy,
};
use serde::{Deserialize, Serialize};

/// DOM compiler options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomCompilerOptions {
    /// Output mode: function or module
    #[serde(default)]
    pub mode: CodegenMode,

    /// Output layout
    #[serde(default)]
    pub style: CodegenStyle,

    /// Whether to prefix identifiers
    #[serde(default)]
    pub prefix_identifiers: bool,

    /// Whether to hoist static nodes
    #[serde(default = "default_true")]
    pub hoist_static: bool,

    /// Whether to cache event handlers
    #[serde(default)]
    pub cache_handlers: bool,

    /// Whether to generate source map
    #[serde(default)]
    pub source_map: bool,

    /// Whether to preserve comments
    #[serde(default = "default_true")]
    pub comments: bool,

    #[serde(default)]
    pub whitespace: WhitespaceStrategy,

    /// Keep compiling past parse errors
    #[serde(default)]
    pub best_effort: bool,

    /// Tags rendered as plain custom elements
    #[serde(skip)]
    pub is_custom_element: Option<fn(&str) -> bool>,
}

fn default_true() -> bool {
    true
}

impl Default for DomCompilerOptions {
    fn default() -> Self {
        Self {
            mode: CodegenMode::Function,
            style: CodegenStyle::Pretty,
            prefix_identifiers: false,
            hoist_static: true,
            cache_handlers: false,
            source_map: false,
            comments: true,
            whitespace: WhitespaceStrategy::Condense,
            best_effort: false,
            is_custom_element: None,
        }
    }
}

impl DomCompilerOptions {
    /// Full compiler options with the DOM tag tables plugged in.
    pub fn to_compiler_options(&self) -> CompilerOptions {
        let mut options = CompilerOptions {
            parser: parser_options(),
            transform: TransformOptions {
                prefix_identifiers: self.prefix_identifiers,
                hoist_static: self.hoist_static,
                cache_handlers: self.cache_handlers,
                is_builtin_component: dom_builtin_component,
                ..Default::default()
            },
            best_effort: self.best_effort,
            ..Default::default()
        };
        options.parser.comments = self.comments;
        options.parser.whitespace = self.whitespace;
        options.codegen.mode = self.mode;
        options.codegen.style = self.style;
        options.codegen.prefix_identifiers = self.prefix_identifiers;
        options.codegen.source_map = self.source_map;
        match self.is_custom_element {
            Some(is_custom_element) => options.with_custom_elements(is_custom_element),
            None => options,
        }
    }
}

/// Parser options for HTML documents
pub fn parser_options() -> ParserOptions {
    ParserOptions {
        is_void_tag: gesso_carton::is_void_tag,
        is_native_tag: Some(gesso_carton::is_native_tag),
        is_pre_tag: |tag| tag == "pre",
        get_namespace,
        ..ParserOptions::default()
    }
}

/// Built-in components, including the DOM transitions
pub fn dom_builtin_component(tag: &str) -> Option<RuntimeHelper> {
    match tag {
        "Transition" | "transition" => Some(RuntimeHelper::Transition),
        "TransitionGroup" | "transition-group" => Some(RuntimeHelper::TransitionGroup),
        _ => core_builtin_component(tag),
    }
}

/// Namespace of an element given its parent's tag
pub fn get_namespace(tag: &str, parent: Option<&str>) -> Namespace {
    if tag == "svg" {
        return Namespace::Svg;
    }
    if tag == "math" {
        return Namespace::MathMl;
    }
    match parent {
        Some(parent) if gesso_carton::is_svg_tag(parent) && parent != "foreignObject" => {
            Namespace::Svg
        }
        Some(parent)
            if gesso_carton::is_math_ml_tag(parent)
                && parent != "annotation-xml"
                && tag != "svg" =>
        {
            Namespace::MathMl
        }
        _ => Namespace::Html,
    }
}

/// DOM-specific element checks
pub mod element_checks {
    use phf::phf_set;

    /// Elements v-model binds to natively
    pub static V_MODEL_ELEMENTS: phf::Set<&'static str> = phf_set! {
        "input", "textarea", "select"
    };

    #[inline]
    pub fn is_v_model_element(tag: &str) -> bool {
        V_MODEL_ELEMENTS.contains(tag)
    }
}

/// Event modifier classification for v-on
pub mod event_modifiers {
    use phf::phf_set;

    /// Modifiers that become `addEventListener` options
    pub static EVENT_OPTION_MODIFIERS: phf::Set<&'static str> = phf_set! {
        "passive", "once", "capture"
    };

    /// Modifiers checked against the event itself, not its key
    pub static NON_KEY_MODIFIERS: phf::Set<&'static str> = phf_set! {
        "stop", "prevent", "self", "ctrl", "shift", "alt", "meta", "exact",
        "middle"
    };

    /// Mouse buttons on click events, arrow keys on keyboard events
    pub static MAYBE_KEY_MODIFIERS: phf::Set<&'static str> = phf_set! {
        "left", "right"
    };

    pub static KEYBOARD_EVENTS: phf::Set<&'static str> = phf_set! {
        "onkeyup", "onkeydown", "onkeypress"
    };

    #[inline]
    pub fn is_event_option_modifier(modifier: &str) -> bool {
        EVENT_OPTION_MODIFIERS.contains(modifier)
    }

    #[inline]
    pub fn is_non_key_modifier(modifier: &str) -> bool {
        NON_KEY_MODIFIERS.contains(modifier)
    }

    #[inline]
    pub fn maybe_key_modifier(modifier: &str) -> bool {
        MAYBE_KEY_MODIFIERS.contains(modifier)
    }

    /// `key` is a handler key such as `onKeyup`; case is ignored.
    pub fn is_keyboard_event(key: &str) -> bool {
        KEYBOARD_EVENTS.contains(key.to_ascii_lowercase().as_str())
    }
}

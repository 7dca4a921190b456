//! Armature - The structural parser for Gesso templates.
//!
//! Turns template source into the [`gesso_relief`] AST, collecting
//! recoverable diagnostics along the way.
//!
//! ```
//! use gesso_armature::parse;
//! use gesso_carton::Bump;
//!
//! let allocator = Bump::new();
//! let (root, errors) = parse(&allocator, "<p>{{ msg }}</p>");
//! assert!(errors.is_empty());
//! assert_eq!(root.children.len(), 1);
//! ```

pub mod for_expression;
pub mod parser;

pub use for_expression::parse_for_expression;
pub use parser::{parse, parse_with_options, Parser};

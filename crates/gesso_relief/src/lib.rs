//! Relief - The sculptured AST surface for Gesso templates.
//!
//! The node model shared by the parser, the transform pipeline and codegen,
//! together with compiler options and error types.

pub mod ast;
pub mod errors;
pub mod options;

pub use ast::*;
pub use errors::*;
pub use options::*;

pub use gesso_carton::Bump as Allocator;

//! Carton - The artist's toolbox for Gesso.
//!
//! Foundational types shared by every Gesso crate: the arena the AST lives in,
//! the string type used for names and source text, fast hash collections,
//! compile-time lookup tables and the patch flag set.
//!
//! # Example
//!
//! ```
//! use gesso_carton::{Box, Bump, Vec};
//!
//! let allocator = Bump::new();
//!
//! let boxed = Box::new_in(42, &allocator);
//! assert_eq!(*boxed, 42);
//!
//! let mut vec = Vec::new_in(&allocator);
//! vec.push(1);
//! vec.push(2);
//! assert_eq!(vec.len(), 2);
//! ```

pub mod dom_tag_config;
pub mod flags;
pub mod general;

// Arena types
pub use bumpalo::boxed::Box;
pub use bumpalo::collections::Vec;
pub use bumpalo::Bump;

// Re-export compact_str::CompactString for convenience
pub use compact_str::format_compact;
pub use compact_str::CompactString;
pub use compact_str::CompactString as String;

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export bitflags for flag types
pub use bitflags::bitflags;

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};

// Re-export phf for compile-time perfect hash functions
pub use phf::{phf_map, phf_set, Map as PhfMap, Set as PhfSet};

pub use dom_tag_config::*;
pub use flags::*;
pub use general::*;

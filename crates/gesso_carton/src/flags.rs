//! Optimization flags attached to generated vnode calls.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

bitflags::bitflags! {
    /// Hints telling the runtime which parts of a vnode may change between renders.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PatchFlags: i32 {
        /// Dynamic text content
        const TEXT = 1;
        /// Dynamic class binding
        const CLASS = 1 << 1;
        /// Dynamic style binding
        const STYLE = 1 << 2;
        /// Dynamic props other than class/style (names listed in dynamicProps)
        const PROPS = 1 << 3;
        /// Props with dynamic keys; full diff required
        const FULL_PROPS = 1 << 4;
        /// Event listeners that must be attached during hydration
        const NEED_HYDRATION = 1 << 5;
        /// Fragment whose children order never changes
        const STABLE_FRAGMENT = 1 << 6;
        /// Fragment with keyed children
        const KEYED_FRAGMENT = 1 << 7;
        /// Fragment with unkeyed children
        const UNKEYED_FRAGMENT = 1 << 8;
        /// Only non-props patching needed (ref, directives)
        const NEED_PATCH = 1 << 9;
        /// Component with dynamic slots
        const DYNAMIC_SLOTS = 1 << 10;
        /// Fragment created only because of comments at root level
        const DEV_ROOT_FRAGMENT = 1 << 11;
    }
}

impl PatchFlags {
    /// Marker for vnodes built once outside the render function.
    pub const HOISTED: i32 = -1;
    /// Same value as [`PatchFlags::HOISTED`], used for cached subtrees.
    pub const CACHED: i32 = -1;
    /// Marker telling the diff algorithm to leave optimized mode.
    pub const BAIL: i32 = -2;

    /// Names of the set flags, lowest bit first.
    pub fn names(&self) -> SmallVec<[&'static str; 4]> {
        let mut names = SmallVec::new();
        for (name, _) in self.iter_names() {
            names.push(name);
        }
        names
    }

    /// Render as `value /* NAME, NAME */`, the form emitted into generated code.
    pub fn to_annotated_string(&self) -> std::string::String {
        format!("{} /* {} */", self.bits(), self.names().join(", "))
    }
}

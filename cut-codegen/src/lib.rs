//! C test function generation
//!
//! This crate turns resolved cases into standalone C test functions. It
//! synthesizes the allocations pointer arguments need, assigns the solver
//! model's literals, calls the function under test, and keeps a run-wide
//! registry so that identical cases produce a single test.

#![warn(missing_docs)]

pub mod assembler;
pub mod memory;
pub mod registry;
pub mod stmt;

pub use assembler::{TestFunction, Translator};
pub use registry::CaseRegistry;
pub use stmt::{CFunction, CStmt};

/// Options for C test generation
#[derive(Debug, Clone, PartialEq)]
pub struct CodegenOptions {
    /// Prefix of every generated function name
    pub test_prefix: String,

    /// Allocation primitive provided by the test runtime
    pub alloc_fn: String,

    /// Primitive releasing everything `alloc_fn` handed out
    pub release_fn: String,

    /// Prefix of the counters in allocation loops
    pub loop_var_prefix: String,

    /// Spaces per nesting level
    pub indent: usize,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            test_prefix: "test_".to_string(),
            alloc_fn: "mymalloc".to_string(),
            release_fn: "myfree".to_string(),
            loop_var_prefix: "cam_loop_".to_string(),
            indent: 2,
        }
    }
}

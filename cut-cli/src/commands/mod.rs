//! Command implementations

pub mod generate;
pub mod translate;

use anyhow::{Context, Result};
use cut_codegen::TestFunction;
use cut_core::Declarations;
use std::path::Path;

/// Load the knowledge base; without it no case can be resolved.
pub fn load_knowledge(path: &Path) -> Result<Declarations> {
    Declarations::load(path)
        .with_context(|| format!("Failed to load knowledge base {}", path.display()))
}

/// Concatenate generated functions into one translation unit body.
///
/// Call results that were left unsynthesized are noted above their test.
pub fn render_tests(tests: &[TestFunction]) -> String {
    let mut out = String::new();
    for (i, test) in tests.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for (symbol, callee) in &test.call_names {
            out.push_str(&format!("/* {} is the return of {}(), not stubbed */\n", symbol, callee));
        }
        out.push_str(&test.source);
    }
    out
}

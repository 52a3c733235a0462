//! Allocation synthesis for pointer-typed symbols
//!
//! Every pointer symbol that owns its storage (its slot sits at depth zero)
//! gets a buffer large enough for every index the resolver saw at that
//! depth. Deeper indirections are filled by counted loops over the outer
//! buffer.

use crate::stmt::CStmt;
use crate::CodegenOptions;
use cut_core::types::{element_type, pointer_depth, real_type};
use cut_core::{CaseTables, Error, Expr, KnowledgeBase, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Builds allocation statements for one case
pub struct MemorySynthesizer<'a> {
    case: &'a CaseTables,
    kb: &'a dyn KnowledgeBase,
    options: &'a CodegenOptions,
}

impl<'a> MemorySynthesizer<'a> {
    /// Create a synthesizer over a resolved case
    pub fn new(case: &'a CaseTables, kb: &'a dyn KnowledgeBase, options: &'a CodegenOptions) -> Self {
        Self { case, kb, options }
    }

    /// Allocation statements for every owning pointer symbol, in
    /// registration order. `exprs` holds each symbol's expression with
    /// references already substituted.
    pub fn synthesize(&self, exprs: &FxHashMap<String, Expr>) -> Result<Vec<CStmt>> {
        let mut stmts = Vec::new();
        let mut allocated = FxHashSet::default();

        for name in &self.case.order {
            let (Some(slot), Some(expr), Some(declared)) = (
                self.case.slots.get(name),
                exprs.get(name),
                self.case.types.get(name),
            ) else {
                continue;
            };
            if slot.depth > 0 || expr.is_array_access() {
                continue;
            }

            let ty = real_type(self.kb, declared);
            let levels = pointer_depth(&ty);
            if levels == 0 {
                continue;
            }

            let target = expr.to_string();
            if !allocated.insert(target.clone()) {
                debug!("{} already allocated", target);
                continue;
            }
            debug!("allocating {} as {} ({} levels)", target, ty, levels);
            stmts.extend(self.allocate(&target, &ty, &slot.root, 0, levels)?);
        }

        Ok(stmts)
    }

    /// Statements allocating the buffer at `depth` and everything below it
    fn allocate(
        &self,
        target: &str,
        ty: &str,
        root: &str,
        depth: usize,
        levels: usize,
    ) -> Result<Vec<CStmt>> {
        let element = element_type(ty, depth).ok_or_else(|| Error::UnresolvableType {
            ty: ty.to_string(),
            depth,
        })?;
        let count = self.case.size_hint(root, depth);

        if depth == 0 {
            let mut stmts = vec![CStmt::assign(target, self.alloc_call(&element, count))];
            if levels > 1 {
                stmts.extend(self.allocate(target, ty, root, 1, levels)?);
            }
            return Ok(stmts);
        }

        let var = format!("{}{}", self.options.loop_var_prefix, depth);
        let slot = format!("{}[{}]", target, var);
        let mut body = vec![CStmt::assign(slot.as_str(), self.alloc_call(&element, count))];
        if depth + 1 < levels {
            body.extend(self.allocate(&slot, ty, root, depth + 1, levels)?);
        }
        Ok(vec![CStmt::For {
            var,
            bound: self.case.size_hint(root, depth - 1),
            body,
        }])
    }

    fn alloc_call(&self, element: &str, count: u64) -> String {
        format!("{}(sizeof({}) * {})", self.options.alloc_fn, element, count)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

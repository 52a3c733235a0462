//! Case descriptions and their per-case translation tables
//!
//! A case is one feasible path reported by the analysis engine. The raw
//! description is normalised once by [`preprocess`] into [`CaseTables`],
//! which then grow while the parser discovers nested symbols.

use crate::ast::Expr;
use crate::traits::KnowledgeBase;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Parameters bound to compiler-internal values cannot be represented.
pub const BUILTIN_MARKER: &str = "__builtin";

/// Prefix of analyzer-introduced values with no syntactic origin
pub const CONJURED_MARKER: &str = "conj_$";

/// One case as emitted by the analysis engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCase {
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub types: BTreeMap<String, String>,
}

/// Position of a symbol's storage relative to the argument that owns it.
///
/// `depth` counts the index steps taken from `root`: the root itself is at
/// depth 0, `root[i]` at depth 1, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slot {
    pub root: String,
    pub depth: usize,
}

impl Slot {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            root: name.into(),
            depth: 0,
        }
    }

    /// The slot reached by indexing into this one
    pub fn element(&self) -> Self {
        Self {
            root: self.root.clone(),
            depth: self.depth + 1,
        }
    }
}

/// Normalised tables for one case
#[derive(Debug, Clone, Default)]
pub struct CaseTables {
    /// Symbol → raw value expression
    pub parameters: BTreeMap<String, String>,
    /// Symbol → literal from the solver model
    pub values: BTreeMap<String, String>,
    /// Symbol → C type spelling
    pub types: BTreeMap<String, String>,
    /// Symbols whose value is the return of another known function
    pub call_names: BTreeMap<String, String>,
    pub call_values: BTreeMap<String, String>,
    /// Symbol → parsed expression tree
    pub asts: FxHashMap<String, Expr>,
    /// Symbol → storage slot, fixed at definition time
    pub slots: FxHashMap<String, Slot>,
    /// Symbols in the order they were first registered
    pub order: Vec<String>,
    size_hints: FxHashMap<Slot, u64>,
}

impl CaseTables {
    /// Register a symbol. Returns `false` when it was already registered;
    /// the first definition is kept.
    pub fn register(
        &mut self,
        name: &str,
        raw: &str,
        expr: Expr,
        ty: Option<String>,
        slot: Slot,
    ) -> bool {
        if self.slots.contains_key(name) {
            return false;
        }
        debug!("register {} = {} at {:?}", name, expr, slot);
        self.parameters
            .entry(name.to_string())
            .or_insert_with(|| raw.to_string());
        self.asts.insert(name.to_string(), expr);
        if let Some(ty) = ty {
            self.types.insert(name.to_string(), ty);
        }
        self.slots.insert(name.to_string(), slot);
        self.order.push(name.to_string());
        true
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Record that index `size - 1` was used at `slot`. Hints never shrink.
    pub fn record_size_hint(&mut self, slot: &Slot, size: u64) {
        let hint = self.size_hints.entry(slot.clone()).or_insert(0);
        if size > *hint {
            debug!("size hint {:?}: {} -> {}", slot, hint, size);
            *hint = size;
        }
    }

    /// Minimum buffer length at `slot`; one element without evidence
    pub fn size_hint(&self, root: &str, depth: usize) -> u64 {
        let slot = Slot {
            root: root.to_string(),
            depth,
        };
        self.size_hints.get(&slot).copied().unwrap_or(0).max(1)
    }

    /// Raw recorded hint, `None` when nothing indexed the slot
    pub fn recorded_size_hint(&self, root: &str, depth: usize) -> Option<u64> {
        let slot = Slot {
            root: root.to_string(),
            depth,
        };
        self.size_hints.get(&slot).copied()
    }
}

/// Split a solver model into a value table.
///
/// Hex literals printed as `#x1A` become `0x1A`.
pub fn parse_model(model: &str) -> BTreeMap<String, String> {
    model
        .replace("#x", "0x")
        .lines()
        .filter_map(|line| {
            let (symbol, literal) = line.split_once("->")?;
            Some((symbol.trim().to_string(), literal.trim().to_string()))
        })
        .collect()
}

/// Normalise a raw case: drop builtin-bound parameters and move conjured
/// call results into the call tables.
pub fn preprocess(raw: RawCase, kb: &dyn KnowledgeBase) -> CaseTables {
    let mut tables = CaseTables {
        values: parse_model(&raw.model),
        parameters: raw.parameters,
        types: raw.types,
        ..Default::default()
    };

    let builtins: Vec<String> = tables
        .parameters
        .iter()
        .filter(|(_, expr)| expr.starts_with(BUILTIN_MARKER))
        .map(|(name, _)| name.clone())
        .collect();
    for name in builtins {
        debug!("dropping builtin-bound parameter {}", name);
        tables.parameters.remove(&name);
        tables.values.remove(&name);
        tables.types.remove(&name);
    }

    let calls: Vec<String> = tables
        .parameters
        .iter()
        .filter(|(name, expr)| name.starts_with(CONJURED_MARKER) && kb.has_function(expr.trim()))
        .map(|(name, _)| name.clone())
        .collect();
    for name in calls {
        if let Some(callee) = tables.parameters.remove(&name) {
            debug!("{} is the result of calling {}", name, callee);
            tables.call_names.insert(name.clone(), callee);
        }
        if let Some(value) = tables.values.remove(&name) {
            tables.call_values.insert(name, value);
        }
    }

    tables
}

#[cfg(test)]
#[path = "case_tests.rs"]
mod tests;

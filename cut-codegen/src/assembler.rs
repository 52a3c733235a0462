//! Test function assembly
//!
//! One case becomes one `void` function: declarations of the target's
//! parameters, allocations, literal assignments, the call under test and
//! the release of everything allocated.

use crate::memory::MemorySynthesizer;
use crate::registry::CaseRegistry;
use crate::stmt::{CFunction, CStmt};
use crate::CodegenOptions;
use cut_core::case::CONJURED_MARKER;
use cut_core::types::{is_pointer, real_type};
use cut_core::{preprocess, CaseTables, Error, Expr, KnowledgeBase, RawCase, Result};
use cut_parser::resolve_parameters;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// A generated test function
#[derive(Debug, Clone, PartialEq)]
pub struct TestFunction {
    /// Name of the generated C function
    pub name: String,
    /// Sequential id of the case within the run
    pub case_id: usize,
    /// Complete C definition
    pub source: String,
    /// Symbols bound to the return of another function. They are reported
    /// but not stubbed.
    pub call_names: BTreeMap<String, String>,
}

/// Translates cases of one run into test functions
pub struct Translator<'a> {
    kb: &'a dyn KnowledgeBase,
    registry: &'a CaseRegistry,
    options: CodegenOptions,
}

impl<'a> Translator<'a> {
    /// Create a translator sharing the run's registry
    pub fn new(kb: &'a dyn KnowledgeBase, registry: &'a CaseRegistry, options: CodegenOptions) -> Self {
        Self {
            kb,
            registry,
            options,
        }
    }

    /// Translate one case. `Ok(None)` means the case duplicates one seen
    /// earlier in the run.
    pub fn translate(&self, function: &str, raw: RawCase) -> Result<Option<TestFunction>> {
        let mut case = preprocess(raw, self.kb);

        let Some(case_id) = self.registry.register(function, &case.values) else {
            debug!("duplicate case for {}", function);
            return Ok(None);
        };

        let params = self
            .kb
            .function_parameters(function)
            .ok_or_else(|| Error::UnknownFunction(function.to_string()))?;

        let mut body: Vec<CStmt> = params
            .iter()
            .map(|param| CStmt::declare(param.ty.as_str(), param.name.as_str()))
            .collect();

        resolve_parameters(&mut case, self.kb)?;
        let exprs = substitute_references(&case);

        body.extend(MemorySynthesizer::new(&case, self.kb, &self.options).synthesize(&exprs)?);
        body.extend(self.assignments(&case, &exprs));
        body.push(CStmt::call(
            function,
            params.iter().map(|param| param.name.clone()).collect(),
        ));
        body.push(CStmt::call(self.options.release_fn.as_str(), Vec::new()));

        let name = format!("{}{}_{}", self.options.test_prefix, function, case_id);
        let source = CFunction {
            name: name.clone(),
            body,
        }
        .render(self.options.indent);

        if !case.call_names.is_empty() {
            debug!(
                "{} leaves {} call result(s) unsynthesized",
                name,
                case.call_names.len()
            );
        }
        info!("generated {}", name);

        Ok(Some(TestFunction {
            name,
            case_id,
            source,
            call_names: case.call_names,
        }))
    }

    /// Translate every case of a function, skipping cases that fail on
    /// their own. Errors that no case can recover from are returned.
    pub fn translate_all(&self, function: &str, cases: Vec<RawCase>) -> Result<Vec<TestFunction>> {
        let mut tests = Vec::new();
        for (index, raw) in cases.into_iter().enumerate() {
            match self.translate(function, raw) {
                Ok(Some(test)) => tests.push(test),
                Ok(None) => {}
                Err(err) if err.is_case_local() => {
                    warn!("skipping case {} of {}: {}", index, function, err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(tests)
    }

    /// `expr = literal;` for every model value whose symbol is not a pointer
    fn assignments(&self, case: &CaseTables, exprs: &FxHashMap<String, Expr>) -> Vec<CStmt> {
        let mut stmts = Vec::new();
        for (symbol, literal) in &case.values {
            let (Some(expr), Some(ty)) = (exprs.get(symbol), case.types.get(symbol)) else {
                debug!("no binding for model value {}", symbol);
                continue;
            };
            if is_pointer(&real_type(self.kb, ty)) {
                continue;
            }
            stmts.push(CStmt::assign(expr.to_string(), literal.as_str()));
        }
        stmts
    }
}

/// Replace identifiers that name other symbols with those symbols' trees
fn substitute_references(case: &CaseTables) -> FxHashMap<String, Expr> {
    let budget = case.asts.len();
    case.asts
        .iter()
        .map(|(name, expr)| (name.clone(), expand(expr, case, budget)))
        .collect()
}

fn expand(expr: &Expr, case: &CaseTables, budget: usize) -> Expr {
    if budget == 0 {
        return expr.clone();
    }
    expr.map_identifiers(&mut |name| {
        let bound = case.asts.get(symbol_key(name))?;
        if bound.as_identifier() == Some(name) {
            return None;
        }
        Some(expand(bound, case, budget - 1))
    })
}

/// `conj_$N{...}` payloads name the symbol before the brace
fn symbol_key(name: &str) -> &str {
    match name.find('{') {
        Some(pos) if name.starts_with(CONJURED_MARKER) => &name[..pos],
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cut_core::Slot;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_symbol_key() {
        assert_eq!(symbol_key("conj_$3{int, LC1, S1, #1}"), "conj_$3");
        assert_eq!(symbol_key("reg_$0"), "reg_$0");
        assert_eq!(symbol_key("p"), "p");
    }

    #[test]
    fn test_references_substituted() {
        let mut case = CaseTables::default();
        case.register("reg_$0", "p", Expr::ident("p"), None, Slot::root("reg_$0"));
        case.register(
            "reg_$1",
            "reg_$0",
            Expr::index(Expr::ident("reg_$0"), 1),
            None,
            Slot::root("reg_$1"),
        );
        let exprs = substitute_references(&case);
        assert_eq!(exprs["reg_$1"].to_string(), "p[1]");
    }

    #[test]
    fn test_reference_cycles_terminate() {
        let mut case = CaseTables::default();
        case.register("reg_$0", "reg_$1", Expr::ident("reg_$1"), None, Slot::root("reg_$0"));
        case.register("reg_$1", "reg_$0", Expr::ident("reg_$0"), None, Slot::root("reg_$1"));
        let exprs = substitute_references(&case);
        assert_eq!(exprs.len(), 2);
    }
}

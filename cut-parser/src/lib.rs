//! Parser and resolver for the analysis engine's symbolic value language
//!
//! The language is small and has no formal grammar upstream; the lexer
//! recognises its leading markers and delimiters, and a recursive descent
//! parser turns each value into an [`Expr`](cut_core::Expr) while recording
//! symbol definitions and buffer size evidence in the case tables.

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{ErrorKind, ParseError};
pub use parser::{ParseResult, Parsed, Parser};

use cut_core::{CaseTables, KnowledgeBase};

/// Parse one value expression against a case
pub fn parse_value(
    source: &str,
    case: &mut CaseTables,
    kb: &dyn KnowledgeBase,
) -> ParseResult<Parsed> {
    Parser::new(source, case, kb)?.parse()
}

/// Parse every model parameter of a case and register its tree.
///
/// Plain names go first; a compound value that refers to another parameter
/// by bare `reg_$N` resolves that parameter before using it as an owner.
pub fn resolve_parameters(case: &mut CaseTables, kb: &dyn KnowledgeBase) -> ParseResult<()> {
    let mut names: Vec<(bool, String)> = case
        .parameters
        .iter()
        .map(|(name, raw)| (is_compound(raw), name.clone()))
        .collect();
    names.sort_by_key(|(compound, _)| *compound);

    for (_, name) in names {
        parser::resolve_parameter(case, kb, &name, &[], Parser::DEFAULT_MAX_DEPTH)?;
    }
    Ok(())
}

fn is_compound(raw: &str) -> bool {
    raw.contains('{') || raw.contains('<')
}

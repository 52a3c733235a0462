//! Translate a single case file to stdout

use super::{load_knowledge, render_tests};
use crate::discovery::load_cases;
use anyhow::Result;
use cut_codegen::{CaseRegistry, CodegenOptions, Translator};
use std::path::Path;

pub fn translate(
    case_file: &Path,
    function: &str,
    knowledge: &Path,
    codegen: CodegenOptions,
) -> Result<()> {
    let kb = load_knowledge(knowledge)?;
    let cases = load_cases(case_file)?;

    let registry = CaseRegistry::new();
    let tests = Translator::new(&kb, &registry, codegen).translate_all(function, cases)?;
    print!("{}", render_tests(&tests));
    Ok(())
}

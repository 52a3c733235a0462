//! Generate test files for every analysed source of a build

use super::{load_knowledge, render_tests};
use crate::discovery::{case_files, load_cases, load_compile_commands, output_path, unique_sources};
use anyhow::{Context, Result};
use colored::*;
use cut_codegen::{CaseRegistry, CodegenOptions, Translator};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Generate configuration
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub compile_commands: PathBuf,
    pub knowledge: PathBuf,
    pub dry_run: bool,
    pub codegen: CodegenOptions,
}

/// What a run produced
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateSummary {
    pub files: usize,
    pub tests: usize,
}

pub fn generate(config: GenerateConfig) -> Result<GenerateSummary> {
    let kb = load_knowledge(&config.knowledge)?;
    let commands = load_compile_commands(&config.compile_commands)?;

    let registry = CaseRegistry::new();
    let translator = Translator::new(&kb, &registry, config.codegen.clone());
    let mut summary = GenerateSummary::default();

    for source in unique_sources(&commands) {
        for case_file in case_files(&source)? {
            info!("{}", case_file.path.display());
            let cases = load_cases(&case_file.path)?;
            let tests = translator
                .translate_all(&case_file.function, cases)
                .with_context(|| format!("Failed to translate {}", case_file.path.display()))?;
            if tests.is_empty() {
                debug!("no new cases in {}", case_file.path.display());
                continue;
            }

            let rendered = render_tests(&tests);
            if config.dry_run {
                print!("{}", rendered);
            } else {
                let out = output_path(&source, &case_file.function);
                fs::write(&out, rendered)
                    .with_context(|| format!("Failed to write {}", out.display()))?;
                println!(
                    "{} {} ({} tests)",
                    "✓".green(),
                    out.display(),
                    tests.len()
                );
            }
            summary.files += 1;
            summary.tests += tests.len();
        }
    }

    info!(
        "{} test functions for {} functions, {} distinct cases",
        summary.tests,
        summary.files,
        registry.len()
    );
    Ok(summary)
}

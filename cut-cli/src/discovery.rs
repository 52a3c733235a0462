//! Locating sources and case files on disk

use anyhow::{Context, Result};
use cut_core::RawCase;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One entry of a compilation database
#[derive(Debug, Clone, Deserialize)]
pub struct CompileCommand {
    pub directory: PathBuf,
    pub file: PathBuf,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl CompileCommand {
    /// Absolute or directory-relative path of the compiled source
    pub fn source(&self) -> PathBuf {
        if self.file.is_absolute() {
            self.file.clone()
        } else {
            self.directory.join(&self.file)
        }
    }

    /// The compiler invocation as one line
    pub fn command_line(&self) -> String {
        self.command
            .clone()
            .unwrap_or_else(|| self.arguments.join(" "))
    }
}

/// Case file produced by the analysis engine for one function of a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseFile {
    pub path: PathBuf,
    pub function: String,
}

pub fn load_compile_commands(path: &Path) -> Result<Vec<CompileCommand>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read compile commands {}", path.display()))?;
    let commands: Vec<CompileCommand> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse compile commands {}", path.display()))?;
    debug!("{} compile commands in {}", commands.len(), path.display());
    for command in &commands {
        debug!("{}: {}", command.directory.display(), command.command_line());
    }
    Ok(commands)
}

/// Sources of all commands, each once, in first-seen order
pub fn unique_sources(commands: &[CompileCommand]) -> Vec<PathBuf> {
    let mut seen = FxHashSet::default();
    commands
        .iter()
        .map(CompileCommand::source)
        .filter(|source| seen.insert(source.clone()))
        .collect()
}

/// Case files next to `source`, named `<source file name>_<function>.json`.
pub fn case_files(source: &Path) -> Result<Vec<CaseFile>> {
    let Some(file_name) = source.file_name().and_then(|name| name.to_str()) else {
        return Ok(Vec::new());
    };
    let dir = match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.is_dir() {
        debug!("source directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let prefix = format!("{}_", file_name);
    let mut found = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let function = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_suffix(".json"))
            .and_then(|stem| stem.strip_prefix(&prefix))
            .filter(|function| !function.is_empty())
            .map(str::to_string);
        if let Some(function) = function {
            found.push(CaseFile { path, function });
        }
    }
    found.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(found)
}

pub fn load_cases(path: &Path) -> Result<Vec<RawCase>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read case file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse case file {}", path.display()))
}

/// `<source>_test_<function>.c`
pub fn output_path(source: &Path, function: &str) -> PathBuf {
    let mut name = OsString::from(source.as_os_str());
    name.push(format!("_test_{}.c", function));
    PathBuf::from(name)
}

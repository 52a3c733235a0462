//! Configuration handling for the cut CLI

use anyhow::{Context, Result};
use cut_codegen::CodegenOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub codegen: CodegenConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodegenConfig {
    #[serde(default = "default_test_prefix")]
    pub test_prefix: String,

    #[serde(default = "default_alloc_fn")]
    pub alloc_fn: String,

    #[serde(default = "default_release_fn")]
    pub release_fn: String,

    #[serde(default = "default_loop_var_prefix")]
    pub loop_var_prefix: String,

    #[serde(default = "default_indent")]
    pub indent: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_compile_commands")]
    pub compile_commands: PathBuf,

    #[serde(default = "default_knowledge")]
    pub knowledge: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            test_prefix: default_test_prefix(),
            alloc_fn: default_alloc_fn(),
            release_fn: default_release_fn(),
            loop_var_prefix: default_loop_var_prefix(),
            indent: default_indent(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            compile_commands: default_compile_commands(),
            knowledge: default_knowledge(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl CodegenConfig {
    /// Options handed to the translator
    pub fn options(&self) -> CodegenOptions {
        CodegenOptions {
            test_prefix: self.test_prefix.clone(),
            alloc_fn: self.alloc_fn.clone(),
            release_fn: self.release_fn.clone(),
            loop_var_prefix: self.loop_var_prefix.clone(),
            indent: self.indent,
        }
    }
}

fn default_test_prefix() -> String { "test_".to_string() }
fn default_alloc_fn() -> String { "mymalloc".to_string() }
fn default_release_fn() -> String { "myfree".to_string() }
fn default_loop_var_prefix() -> String { "cam_loop_".to_string() }
fn default_indent() -> usize { 2 }
fn default_compile_commands() -> PathBuf { PathBuf::from("codechecker_commands.json") }
fn default_knowledge() -> PathBuf { PathBuf::from("cut_knowledge.json") }
fn default_level() -> String { "info".to_string() }

/// Load configuration from `path`, else from `~/.cut/config.toml` when
/// present, else the defaults.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path.or_else(user_config_path) {
        Some(path) => read_config(&path),
        None => Ok(Config::default()),
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".cut").join("config.toml"))
        .filter(|path| path.exists())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
}

/// Write `config` as TOML, creating parent directories
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(config)?)
        .with_context(|| format!("Failed to write config {}", path.display()))
}

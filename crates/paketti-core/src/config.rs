//! Configuration handling for paketti (`paketti.toml`).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PakettiError, PakettiResult};
use crate::sandbox::{SandboxConfig, DIR_PLACEHOLDER};

/// Name of the configuration file looked up by [`Config::discover`].
pub const CONFIG_FILE_NAME: &str = "paketti.toml";

/// Paketti configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub interweave: InterweaveConfig,
    #[serde(default)]
    pub compiler: CompilerConfig,
    #[serde(default)]
    pub format: FormatConfig,
}

/// Which assemblies count as the trusted base runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterweaveConfig {
    /// Types from these assemblies are never interweaves.
    #[serde(default = "default_trusted_assemblies")]
    pub trusted_assemblies: Vec<String>,

    /// Types from these assemblies are always interweaves, trusted or not.
    #[serde(default = "default_always_foreign")]
    pub always_foreign_assemblies: Vec<String>,

    /// Treat every tuple type as an interweave.
    #[serde(default = "default_true")]
    pub tuples_always_foreign: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompilerMode {
    /// Built-in consistency check over the source model.
    #[default]
    Structural,
    /// Run an external command in a sandbox.
    Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(default)]
    pub mode: CompilerMode,

    /// External command; `{dir}` is replaced by the sandbox directory.
    #[serde(default = "default_command")]
    pub command: Vec<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub keep_sandbox_on_failure: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatConfig {
    #[serde(default = "default_indent")]
    pub indent: String,
}

fn default_trusted_assemblies() -> Vec<String> {
    vec![
        "System.Runtime".to_string(),
        "System.Collections".to_string(),
        "System.Diagnostics.Debug".to_string(),
    ]
}

fn default_always_foreign() -> Vec<String> {
    vec!["System.ValueTuple".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_command() -> Vec<String> {
    vec![
        "dotnet".to_string(),
        "build".to_string(),
        DIR_PLACEHOLDER.to_string(),
    ]
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_indent() -> String {
    "    ".to_string()
}

impl Default for InterweaveConfig {
    fn default() -> Self {
        InterweaveConfig {
            trusted_assemblies: default_trusted_assemblies(),
            always_foreign_assemblies: default_always_foreign(),
            tuples_always_foreign: true,
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            mode: CompilerMode::default(),
            command: default_command(),
            timeout_secs: default_timeout_secs(),
            keep_sandbox_on_failure: false,
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        FormatConfig {
            indent: default_indent(),
        }
    }
}

impl CompilerConfig {
    pub fn sandbox(&self) -> SandboxConfig {
        SandboxConfig {
            command: self.command.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            keep_on_failure: self.keep_sandbox_on_failure,
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> PakettiResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| PakettiError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|message| PakettiError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let config: Config = toml::from_str(content).map_err(|e| e.to_string())?;
        if config.compiler.command.is_empty() {
            return Err("compiler.command must not be empty".to_string());
        }
        Ok(config)
    }

    /// Load `paketti.toml` from `dir` if present, defaults otherwise.
    pub fn discover(dir: &Path) -> PakettiResult<Self> {
        let path = Self::path_in(dir);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE_NAME)
    }
}

//! Configuration management for `push_gate`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`PUSH_GATE_*`)
//! 3. Explicit config file (`--config`)
//! 4. Repository config (`$GIT_DIR/push-gate.yaml`)
//! 5. User config (~/.config/push-gate/config.yaml)
//! 6. Defaults
//!
//! The merged layer is converted once into an immutable [`GateConfig`].
//!
//! Scalar values for list keys (from the environment or a YAML string) split
//! on commas, except `branch.prefixes` and `lint.args`, which split on
//! whitespace: regex quantifiers such as `\d{1,5}` contain commas.

use crate::diff::DEFAULT_MAX_CELLS;
use crate::error::{GateError, Result};
use crate::gate::MatchMode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Repository config filename, looked up inside the git directory.
pub const REPO_CONFIG_FILENAME: &str = "push-gate.yaml";
/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "PUSH_GATE_";

/// Every key the gate understands, in canonical dotted form.
pub const KNOWN_KEYS: &[&str] = &[
    "trunk",
    "branch.prefixes",
    "branch.builtin_conventions",
    "branch.match",
    "lint.enabled",
    "lint.command",
    "lint.args",
    "lint.ignore",
    "lint.ignore_flag",
    "lint.extensions",
    "lint.ok_exit_codes",
    "diff.max_cells",
];

/// A raw configuration value before typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Scalar(String),
    List(Vec<String>),
}

impl ConfigValue {
    /// View as a list. Scalars split on commas.
    #[must_use]
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::Scalar(value) => split_list(value),
            Self::List(items) => items.clone(),
        }
    }

    /// View as a scalar. Lists join with commas.
    #[must_use]
    pub fn to_scalar(&self) -> String {
        match self {
            Self::Scalar(value) => value.clone(),
            Self::List(items) => items.join(","),
        }
    }
}

/// One configuration source, keyed by canonical dotted key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, ConfigValue>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        debug!(path = %path.display(), "Loading config file");
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Build a layer from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(contents)?;
        let mut layer = Self::default();
        flatten_yaml(&value, "", &mut layer.values);
        Ok(layer)
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(env::vars())
    }

    /// Build a layer from `PUSH_GATE_*` variables, e.g. `PUSH_GATE_LINT_IGNORE`.
    #[must_use]
    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();

        for (key, value) in vars {
            let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let wanted = env_form(stripped);
            match KNOWN_KEYS.iter().find(|known| env_form(known) == wanted) {
                Some(known) => {
                    layer.set(known, ConfigValue::Scalar(value));
                }
                None => debug!(variable = %key, "Ignoring unknown environment override"),
            }
        }

        layer
    }

    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(normalize_key(key), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(&normalize_key(key))
    }

    fn scalar(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|value| value.to_scalar().trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(ConfigValue::to_list)
    }

    /// Like [`Self::list`], but a scalar splits on whitespace.
    fn words(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|value| match value {
            ConfigValue::List(items) => items.clone(),
            ConfigValue::Scalar(value) => value.split_whitespace().map(str::to_string).collect(),
        })
    }

    fn flag(&self, key: &str) -> Result<Option<bool>> {
        self.scalar(key)
            .map(|value| {
                parse_bool(&value).ok_or_else(|| {
                    GateError::Config(format!("{key}: expected a boolean, got '{value}'"))
                })
            })
            .transpose()
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub trunk: Option<String>,
    pub no_lint: Option<bool>,
    pub branch_match: Option<MatchMode>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(trunk) = &self.trunk {
            layer.set("trunk", ConfigValue::Scalar(trunk.clone()));
        }
        if let Some(true) = self.no_lint {
            layer.set("lint.enabled", ConfigValue::Scalar("false".to_string()));
        }
        if let Some(mode) = self.branch_match {
            layer.set("branch.match", ConfigValue::Scalar(mode.to_string()));
        }

        layer
    }
}

/// Branch naming settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchConfig {
    pub prefixes: Vec<String>,
    pub builtin_conventions: bool,
    #[serde(rename = "match")]
    pub match_mode: MatchMode,
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            prefixes: Vec::new(),
            builtin_conventions: true,
            match_mode: MatchMode::Anywhere,
        }
    }
}

/// Style checker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintConfig {
    pub enabled: bool,
    pub command: String,
    pub args: Vec<String>,
    pub ignore: Vec<String>,
    pub ignore_flag: String,
    pub extensions: Vec<String>,
    pub ok_exit_codes: Vec<i32>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "pycodestyle".to_string(),
            args: vec!["-".to_string()],
            ignore: Vec::new(),
            ignore_flag: "--ignore".to_string(),
            extensions: vec!["py".to_string()],
            ok_exit_codes: vec![0, 1],
        }
    }
}

impl LintConfig {
    /// True if `path` should be handed to the checker.
    #[must_use]
    pub fn applies_to(&self, path: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

/// Line alignment settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffConfig {
    pub max_cells: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

/// Typed, immutable configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    pub trunk: String,
    pub branch: BranchConfig,
    pub lint: LintConfig,
    pub diff: DiffConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            trunk: "master".to_string(),
            branch: BranchConfig::default(),
            lint: LintConfig::default(),
            diff: DiffConfig::default(),
        }
    }
}

impl GateConfig {
    /// Type a merged layer, falling back to defaults for unset keys.
    ///
    /// # Errors
    ///
    /// Returns `Config` for values of the wrong type.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let mut config = Self::default();

        if let Some(trunk) = layer.scalar("trunk") {
            config.trunk = trunk;
        }

        if let Some(prefixes) = layer.words("branch.prefixes") {
            config.branch.prefixes = prefixes;
        }
        if let Some(builtin) = layer.flag("branch.builtin_conventions")? {
            config.branch.builtin_conventions = builtin;
        }
        if let Some(mode) = layer.scalar("branch.match") {
            config.branch.match_mode = mode.parse()?;
        }

        if let Some(enabled) = layer.flag("lint.enabled")? {
            config.lint.enabled = enabled;
        }
        if let Some(command) = layer.scalar("lint.command") {
            config.lint.command = command;
        }
        if let Some(args) = layer.words("lint.args") {
            config.lint.args = args;
        }
        if let Some(ignore) = layer.list("lint.ignore") {
            config.lint.ignore = ignore;
        }
        if let Some(flag) = layer.scalar("lint.ignore_flag") {
            config.lint.ignore_flag = flag;
        }
        if let Some(extensions) = layer.list("lint.extensions") {
            config.lint.extensions = extensions;
        }
        if let Some(codes) = layer.list("lint.ok_exit_codes") {
            config.lint.ok_exit_codes = codes
                .iter()
                .map(|code| {
                    code.parse::<i32>().map_err(|_| {
                        GateError::Config(format!("lint.ok_exit_codes: '{code}' is not an integer"))
                    })
                })
                .collect::<Result<_>>()?;
        }

        if let Some(cells) = layer.scalar("diff.max_cells") {
            config.diff.max_cells = cells
                .parse::<usize>()
                .ok()
                .filter(|&max| max > 0)
                .ok_or_else(|| {
                    GateError::Config(format!("diff.max_cells: '{cells}' is not a positive integer"))
                })?;
        }

        Ok(config)
    }
}

/// Load user config (~/.config/push-gate/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("push-gate")
        .join("config.yaml");
    ConfigLayer::from_yaml(&path)
}

/// Load repository config (`<git_dir>/push-gate.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_repo_config(git_dir: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&git_dir.join(REPO_CONFIG_FILENAME))
}

/// Load an explicitly requested config file, which must exist.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable or invalid.
pub fn load_explicit_config(path: &Path) -> Result<ConfigLayer> {
    if !path.is_file() {
        return Err(GateError::Config(format!(
            "config file not found: {}",
            path.display()
        )));
    }
    ConfigLayer::from_yaml(path)
}

/// Paths that feed [`load_config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub git_dir: Option<PathBuf>,
    pub explicit: Option<PathBuf>,
}

/// Load and type configuration with the documented precedence.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed, or a value
/// has the wrong type.
pub fn load_config(sources: &ConfigSources, cli: &CliOverrides) -> Result<GateConfig> {
    let user = load_user_config()?;
    let repo = match &sources.git_dir {
        Some(dir) => load_repo_config(dir)?,
        None => ConfigLayer::default(),
    };
    let explicit = match &sources.explicit {
        Some(path) => load_explicit_config(path)?,
        None => ConfigLayer::default(),
    };
    let env_layer = ConfigLayer::from_env();
    let cli_layer = cli.as_layer();

    let merged = ConfigLayer::merge_layers(&[user, repo, explicit, env_layer, cli_layer]);
    GateConfig::from_layer(&merged)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('-', "_")
}

fn env_form(key: &str) -> String {
    key.trim().to_lowercase().replace(['.', '-'], "_")
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, ConfigValue>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let items = values.iter().filter_map(yaml_scalar_to_string).collect();
            out.insert(normalize_key(prefix), ConfigValue::List(items));
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(normalize_key(prefix), ConfigValue::Scalar(value));
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}

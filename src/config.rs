use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::{core::matcher::CallPattern, rules::const_pow::RewriteOptions};

pub const CONFIG_FILE_NAME: &str = ".stdpowrc.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub include_dirs: Vec<String>,
    #[serde(default = "default_function")]
    pub function: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_replacement")]
    pub replacement: String,
    #[serde(default = "default_main_file_only")]
    pub main_file_only: bool,
}

fn default_ignores() -> Vec<String> {
    ["**/build/**", "**/third_party/**"].map(String::from).to_vec()
}

fn default_extensions() -> Vec<String> {
    ["cpp", "cc", "cxx", "c++", "cp"].map(String::from).to_vec()
}

fn default_function() -> String {
    "pow".to_string()
}

fn default_namespace() -> String {
    "std".to_string()
}

fn default_replacement() -> String {
    "utils::pow".to_string()
}

fn default_main_file_only() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            includes: Vec::new(),
            ignores: default_ignores(),
            extensions: default_extensions(),
            include_dirs: Vec::new(),
            function: default_function(),
            namespace: default_namespace(),
            replacement: default_replacement(),
            main_file_only: default_main_file_only(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob pattern is invalid or a name is not a
    /// C++ identifier path.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Includes without wildcards are literal directory paths.
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        if self.extensions.is_empty() {
            bail!("'extensions' must list at least one file extension");
        }
        if !is_identifier(&self.function) {
            bail!("Invalid 'function': \"{}\"", self.function);
        }
        if !self.namespace.is_empty() && !is_qualified_identifier(&self.namespace) {
            bail!("Invalid 'namespace': \"{}\"", self.namespace);
        }
        if !is_qualified_identifier(&self.replacement) {
            bail!("Invalid 'replacement': \"{}\"", self.replacement);
        }

        Ok(())
    }

    pub fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            pattern: CallPattern::new(&self.namespace, &self.function, self.main_file_only),
            replacement: self.replacement.clone(),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// `a::b::c`, optionally with a leading `::`.
fn is_qualified_identifier(path: &str) -> bool {
    path.strip_prefix("::")
        .unwrap_or(path)
        .split("::")
        .all(is_identifier)
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            tracing::debug!(path = %path.display(), "loaded config");
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.includes.is_empty());
        assert_eq!(config.ignores, default_ignores());
        assert!(config.extensions.contains(&"cpp".to_string()));
        assert_eq!(config.function, "pow");
        assert_eq!(config.namespace, "std");
        assert_eq!(config.replacement, "utils::pow");
        assert!(config.main_file_only);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
              "ignores": ["**/vendor/**"],
              "includes": ["src"],
              "includeDirs": ["include"],
              "replacement": "fast::ipow",
              "mainFileOnly": false
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.ignores, vec!["**/vendor/**"]);
        assert_eq!(config.includes, vec!["src"]);
        assert_eq!(config.include_dirs, vec!["include"]);
        assert_eq!(config.replacement, "fast::ipow");
        assert!(!config.main_file_only);
        assert_eq!(config.function, "pow");
    }

    #[test]
    fn test_rewrite_options_from_config() {
        let config = Config {
            namespace: "mylib".to_string(),
            function: "power".to_string(),
            replacement: "mylib::ipow".to_string(),
            main_file_only: false,
            ..Default::default()
        };
        let options = config.rewrite_options();
        assert_eq!(options.pattern.target.qualified_name(), "mylib::power");
        assert!(!options.pattern.main_file_only);
        assert_eq!(options.replacement, "mylib::ipow");
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("src").join("math");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        let found = find_config_file(&sub_dir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        assert!(find_config_file(dir.path()).is_none());
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{ "ignores": [] }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert!(config.ignores.is_empty());
        assert_eq!(config.extensions, default_extensions());
        assert_eq!(config.replacement, default_replacement());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "ignores": ["**/gen/**"] }"#,
        )
        .unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(result.from_file);
        assert_eq!(result.config.ignores, vec!["**/gen/**"]);
    }

    #[test]
    fn test_load_config_default_when_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(!result.from_file);
        assert_eq!(result.config.ignores, default_ignores());
    }

    #[test]
    fn test_validate_invalid_ignore_pattern() {
        let config = Config {
            ignores: vec!["[invalid".to_string()],
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("ignores"));
    }

    #[test]
    fn test_validate_invalid_include_pattern() {
        let config = Config {
            includes: vec!["src/**/[invalid".to_string()],
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("includes"));
    }

    #[test]
    fn test_validate_names() {
        let bad_function = Config {
            function: "po w".to_string(),
            ..Default::default()
        };
        assert!(bad_function.validate().is_err());

        let bad_replacement = Config {
            replacement: "utils::".to_string(),
            ..Default::default()
        };
        assert!(bad_replacement.validate().is_err());

        let global_namespace = Config {
            namespace: String::new(),
            ..Default::default()
        };
        assert!(global_namespace.validate().is_ok());

        let nested = Config {
            namespace: "a::b".to_string(),
            replacement: "::fast::ipow".to_string(),
            ..Default::default()
        };
        assert!(nested.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_extensions() {
        let config = Config {
            extensions: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_with_invalid_pattern_fails() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "ignores": ["[invalid"] }"#,
        )
        .unwrap();

        assert!(load_config(dir.path()).is_err());
    }

    #[test]
    fn test_default_config_json_round_trips() {
        let json = default_config_json().unwrap();
        assert!(json.contains("\"mainFileOnly\": true"));
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.replacement, "utils::pow");
    }
}

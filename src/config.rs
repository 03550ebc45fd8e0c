//! `ctxpack.toml` loading and the settings derived from it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::rules::{
    IgnoreRules, ImportanceWeights, DEFAULT_FILE_WEIGHT, DEFAULT_FORMAT_WEIGHT,
    DEFAULT_PATH_WEIGHT, DEFAULT_PATTERN_WEIGHT,
};
use crate::scan::ScanOptions;
use crate::select::DEFAULT_TOKEN_BUDGET;
use crate::tokens::TokenizerKind;

pub const DEFAULT_CONFIG_FILE: &str = "ctxpack.toml";

const DEFAULT_FORMATS: &str = ".py,.md,.txt,.ini,.json,.yaml,.yml,.toml,.cfg,.conf,.sh,.bat,.js,.jsx,.ts,.tsx,.html,.css,.scss,.sql,.rst,.rs";
const DEFAULT_FILES: &str = "README.md,requirements.txt,setup.py,pyproject.toml,package.json,Cargo.toml,.env.example,Dockerfile,docker-compose.yml,Makefile,LICENSE";
const DEFAULT_PATHS: &str = "src/,docs/,scripts/,config/,templates/";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: Settings,
    pub file_importance: FileImportance,
    /// Directory relative paths in the file are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub path: Option<String>,
    pub output_dir: String,
    pub max_tokens: i64,
    pub ignore: String,
    pub important_files_path: String,
    pub generate_structure: bool,
    pub tokenizer: TokenizerKind,
    pub respect_gitignore: bool,
    pub reserve_structure_tokens: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            path: None,
            output_dir: "output".to_string(),
            max_tokens: DEFAULT_TOKEN_BUDGET as i64,
            ignore: ".ignore".to_string(),
            important_files_path: "important_files.txt".to_string(),
            generate_structure: true,
            tokenizer: TokenizerKind::default(),
            respect_gitignore: false,
            reserve_structure_tokens: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileImportance {
    pub base_weight: u32,
    pub important_formats: String,
    pub important_files: String,
    pub important_paths: String,
    pub format_weight: u32,
    pub file_weight: u32,
    pub path_weight: u32,
    pub pattern_weight: u32,
}

impl Default for FileImportance {
    fn default() -> Self {
        Self {
            base_weight: 0,
            important_formats: DEFAULT_FORMATS.to_string(),
            important_files: DEFAULT_FILES.to_string(),
            important_paths: DEFAULT_PATHS.to_string(),
            format_weight: DEFAULT_FORMAT_WEIGHT,
            file_weight: DEFAULT_FILE_WEIGHT,
            path_weight: DEFAULT_PATH_WEIGHT,
            pattern_weight: DEFAULT_PATTERN_WEIGHT,
        }
    }
}

impl Config {
    /// Load an explicitly named config file, or `ctxpack.toml` in `search_dir`.
    ///
    /// A missing default file yields built-in defaults; a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>, search_dir: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
                }
                Self::from_file(path)
            }
            None => {
                let path = search_dir.join(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::from_file(&path)
                } else {
                    tracing::debug!(dir = %search_dir.display(), "no config file, using defaults");
                    Ok(Self {
                        base_dir: search_dir.to_path_buf(),
                        ..Self::default()
                    })
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut config = Self::parse(&text, path)?;
        config.base_dir = base_dir;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settings.max_tokens <= 0 {
            return Err(ConfigError::NonPositiveBudget(self.settings.max_tokens));
        }
        Ok(())
    }

    pub fn token_budget(&self) -> Result<usize, ConfigError> {
        self.validate()?;
        Ok(self.settings.max_tokens as usize)
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// The CLI path wins, then `settings.path`, then the config directory.
    pub fn project_root(&self, cli_path: Option<&Path>) -> PathBuf {
        match (cli_path, &self.settings.path) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(path)) => self.resolve(path),
            (None, None) => self.base_dir.clone(),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.settings.output_dir)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            respect_gitignore: self.settings.respect_gitignore,
            follow_links: false,
        }
    }

    /// Ignore rules from the configured file, plus the output directory when it
    /// lives inside the project so earlier exports are never re-packed.
    pub fn ignore_rules(&self, root: &Path) -> Result<IgnoreRules, ConfigError> {
        let rules = IgnoreRules::load(&self.resolve(&self.settings.ignore))?;

        match output_inside_root(&self.output_dir(), root) {
            Some(relative) => Ok(rules.with_pattern(&format!("/{}/", relative))),
            None => Ok(rules),
        }
    }

    pub fn importance_weights(&self) -> Result<ImportanceWeights, ConfigError> {
        let fi = &self.file_importance;
        let mut weights = ImportanceWeights::new(fi.base_weight);
        weights.parse_formats(&fi.important_formats, fi.format_weight)?;
        weights.parse_files(&fi.important_files, fi.file_weight)?;
        weights.parse_paths(&fi.important_paths, fi.path_weight)?;
        weights.load_pattern_list(
            &self.resolve(&self.settings.important_files_path),
            fi.pattern_weight,
        )?;
        Ok(weights)
    }
}

fn output_inside_root(output_dir: &Path, root: &Path) -> Option<String> {
    let output_dir = output_dir.canonicalize().ok()?;
    let root = root.canonicalize().ok()?;
    let relative = output_dir.strip_prefix(&root).ok()?;
    let relative = relative.to_string_lossy().replace('\\', "/");
    if relative.is_empty() {
        None
    } else {
        Some(relative)
    }
}

/// Contents written by `ctxpack init`.
pub fn default_toml() -> String {
    let settings = Settings::default();
    let fi = FileImportance::default();
    format!(
        r#"# ctxpack configuration

[settings]
# path = "."
output_dir = "{output_dir}"
max_tokens = {max_tokens}
ignore = "{ignore}"
important_files_path = "{important}"
generate_structure = {structure}
# heuristic, chars or tiktoken (exact BPE count, not monotonic)
tokenizer = "{tokenizer}"
respect_gitignore = {gitignore}
reserve_structure_tokens = {reserve}

[file_importance]
base_weight = {base}
# Comma-separated; append `:<weight>` to override the default weight of an entry
important_formats = "{formats}"
important_files = "{files}"
important_paths = "{paths}"
format_weight = {format_weight}
file_weight = {file_weight}
path_weight = {path_weight}
pattern_weight = {pattern_weight}
"#,
        output_dir = settings.output_dir,
        max_tokens = settings.max_tokens,
        ignore = settings.ignore,
        important = settings.important_files_path,
        structure = settings.generate_structure,
        tokenizer = settings.tokenizer,
        gitignore = settings.respect_gitignore,
        reserve = settings.reserve_structure_tokens,
        base = fi.base_weight,
        formats = fi.important_formats,
        files = fi.important_files,
        paths = fi.important_paths,
        format_weight = fi.format_weight,
        file_weight = fi.file_weight,
        path_weight = fi.path_weight,
        pattern_weight = fi.pattern_weight,
    )
}

//! Account configuration loading and validation.
//!
//! The configuration file is a flat `key = value` TOML subset: quoted
//! string values, `["a", "b"]` string arrays, and `#` comments. All
//! validation happens at load time; an [`AccountConfig`] that exists is
//! complete and immutable.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Fixed User-Agent sent with every request to the site.
pub const REQUEST_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; WOW64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/51.0.2704.103 Safari/537.36";

/// Default base URL of the publisher site.
pub const DEFAULT_BASE_URL: &str = "https://www.packtpub.com";

/// Path of the login/registration page, relative to the base URL.
pub const LOGIN_PATH: &str = "/register";

/// Path of the account "my ebooks" page, relative to the base URL.
pub const MY_BOOKS_PATH: &str = "/account/my-ebooks";

/// Path of the daily free-ebook promotion page, relative to the base URL.
pub const PROMO_PATH: &str = "/packt/offers/free-learning";

/// Errors raised while loading or validating the configuration file.
///
/// All of these are fatal and occur before any network I/O.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file '{path}': {source}")]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A line could not be parsed as `key = value`.
    #[error("invalid config syntax on line {line}: {reason}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// Why the line was rejected.
        reason: String,
    },

    /// A required key is absent or empty.
    #[error("missing required config key `{key}`")]
    MissingKey {
        /// The absent key.
        key: &'static str,
    },

    /// The configured download folder does not exist.
    #[error("download folder '{path}' does not exist")]
    DownloadDirMissing {
        /// The configured folder path.
        path: PathBuf,
    },
}

impl ConfigError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    fn syntax(line: usize, reason: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            reason: reason.into(),
        }
    }
}

/// Immutable account configuration.
///
/// Holds credentials, site URLs and download preferences. Constructed
/// only through [`AccountConfig::load`] (or [`AccountConfig::parse`]),
/// which validate every field, so downstream components never re-check.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Account email used for the login form.
    pub email: String,
    /// Account password used for the login form.
    pub password: String,
    /// Base URL of the site; overridable for testing against a local server.
    pub base_url: String,
    /// Folder downloads are written into. Must exist at load time.
    pub download_dir: PathBuf,
    /// Formats to download when no explicit set is requested.
    pub formats: Option<Vec<String>>,
    /// Titles to download with the `--download-chosen` action.
    pub titles: Option<Vec<String>>,
    /// Append-only log file for claimed-book metadata records.
    pub info_log_path: PathBuf,
}

impl AccountConfig {
    /// Loads and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the file cannot be read, a line cannot
    /// be parsed, a required key is absent, or the download folder does
    /// not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::parse(&raw)
    }

    /// Parses and validates configuration from raw file contents.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`AccountConfig::load`], minus `Io`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut email = None;
        let mut password = None;
        let mut base_url = None;
        let mut download_dir = None;
        let mut formats = None;
        let mut titles = None;
        let mut info_log_path = None;

        for (line_index, raw_line) in raw.lines().enumerate() {
            let line_no = line_index + 1;
            let line = strip_inline_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }

            let Some((raw_key, raw_value)) = line.split_once('=') else {
                return Err(ConfigError::syntax(line_no, "expected key = value"));
            };

            let key = raw_key.trim();
            let value = raw_value.trim();

            match key {
                "email" => email = Some(parse_string_literal(value, line_no, key)?),
                "password" => password = Some(parse_string_literal(value, line_no, key)?),
                "base_url" => {
                    let parsed = parse_string_literal(value, line_no, key)?;
                    base_url = Some(parsed.trim_end_matches('/').to_string());
                }
                "download_dir" => {
                    download_dir =
                        Some(PathBuf::from(parse_string_literal(value, line_no, key)?));
                }
                "formats" => formats = Some(parse_string_array(value, line_no, key)?),
                "titles" => titles = Some(parse_string_array(value, line_no, key)?),
                "info_log" => {
                    info_log_path =
                        Some(PathBuf::from(parse_string_literal(value, line_no, key)?));
                }
                other => {
                    return Err(ConfigError::syntax(
                        line_no,
                        format!("unknown config key `{other}`"),
                    ));
                }
            }
        }

        let config = Self {
            email: require_non_empty("email", email)?,
            password: require_non_empty("password", password)?,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            download_dir: download_dir.ok_or(ConfigError::MissingKey {
                key: "download_dir",
            })?,
            formats: formats.filter(|list| !list.is_empty()),
            titles: titles.filter(|list| !list.is_empty()),
            info_log_path: info_log_path.ok_or(ConfigError::MissingKey { key: "info_log" })?,
        };

        if !config.download_dir.is_dir() {
            return Err(ConfigError::DownloadDirMissing {
                path: config.download_dir.clone(),
            });
        }

        Ok(config)
    }

    /// Absolute URL of the login page.
    #[must_use]
    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url, LOGIN_PATH)
    }

    /// Absolute URL of the account "my ebooks" page.
    #[must_use]
    pub fn my_books_url(&self) -> String {
        format!("{}{}", self.base_url, MY_BOOKS_PATH)
    }

    /// Absolute URL of the daily promotion page.
    #[must_use]
    pub fn promo_url(&self) -> String {
        format!("{}{}", self.base_url, PROMO_PATH)
    }

    /// Resolves a site-relative path (e.g. a scraped href) to an absolute URL.
    #[must_use]
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }
}

fn require_non_empty(key: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingKey { key }),
    }
}

/// Strips a trailing `#` comment that is not inside a quoted string.
fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(value: &str, line: usize, key: &str) -> Result<String, ConfigError> {
    let inner = value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| {
            ConfigError::syntax(line, format!("`{key}` expects a double-quoted string"))
        })?;
    if inner.contains('"') {
        return Err(ConfigError::syntax(
            line,
            format!("`{key}` contains an unescaped quote"),
        ));
    }
    Ok(inner.to_string())
}

fn parse_string_array(value: &str, line: usize, key: &str) -> Result<Vec<String>, ConfigError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| {
            ConfigError::syntax(line, format!("`{key}` expects an array of strings"))
        })?;

    // Items are scanned as quoted strings so titles may contain commas.
    let mut items = Vec::new();
    let mut remaining = inner.trim();
    while !remaining.is_empty() {
        let body = remaining.strip_prefix('"').ok_or_else(|| {
            ConfigError::syntax(line, format!("`{key}` expects double-quoted array items"))
        })?;
        let end = body.find('"').ok_or_else(|| {
            ConfigError::syntax(line, format!("`{key}` has an unterminated string"))
        })?;
        items.push(body[..end].to_string());
        remaining = body[end + 1..].trim_start();
        if let Some(rest) = remaining.strip_prefix(',') {
            remaining = rest.trim_start();
        } else if !remaining.is_empty() {
            return Err(ConfigError::syntax(
                line,
                format!("`{key}` expects commas between array items"),
            ));
        }
    }
    Ok(items)
}

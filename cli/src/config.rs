use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use toml_edit::DocumentMut;
use toml_edit::Item as TomlItem;

pub const CONFIG_FILE_NAME: &str = "setup.toml";

/// Project settings, resolved once at startup and passed to whatever needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupConfig {
    /// Display name used in the install banner.
    pub name: String,
    /// Importable package name; owns `version.py` and the `.egg-info` directory.
    pub package_name: String,
    pub version_file: PathBuf,
    pub version_module: PathBuf,
    /// Directory holding the bundled tools, report assets and reference data.
    pub utils_package: PathBuf,
    pub requirements_file: PathBuf,
    pub publish_command: Vec<String>,
    pub debug: bool,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self::with_package_name("utils")
    }
}

impl SetupConfig {
    fn with_package_name(package_name: &str) -> Self {
        Self {
            name: "Utils".to_string(),
            package_name: package_name.to_string(),
            version_file: PathBuf::from("VERSION.txt"),
            version_module: default_version_module(package_name),
            utils_package: PathBuf::from("Utils"),
            requirements_file: PathBuf::from("requirements.txt"),
            publish_command: ["python", "setup.py", "sdist", "upload"]
                .into_iter()
                .map(String::from)
                .collect(),
            debug: false,
        }
    }

    pub fn egg_info_dir(&self) -> String {
        format!("{}.egg-info", self.package_name)
    }
}

fn default_version_module(package_name: &str) -> PathBuf {
    Path::new(package_name).join("version.py")
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn for_project(project_dir: &Path) -> Self {
        Self::new(project_dir.join(CONFIG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads `setup.toml`. A missing file yields defaults; an unparsable one falls back to a
    /// line scan of top-level `key = value` pairs.
    pub fn load(&self) -> anyhow::Result<SetupConfig> {
        let Some(content) = read_document_string(&self.path)? else {
            return Ok(SetupConfig::default());
        };

        match content.parse::<DocumentMut>() {
            Ok(doc) => Ok(config_from_document(&doc)),
            Err(err) => {
                tracing::warn!(
                    "{} is not valid TOML ({err}); reading top-level keys only",
                    self.path.display()
                );
                Ok(config_from_lines(&content))
            }
        }
    }
}

fn config_from_document(doc: &DocumentMut) -> SetupConfig {
    let str_key = |key: &str| {
        doc.get(key)
            .and_then(TomlItem::as_value)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };
    let debug = doc
        .get("debug")
        .and_then(TomlItem::as_value)
        .and_then(|v| v.as_bool());

    let mut config = config_from_scalars(str_key, debug);
    if let Some(array) = doc
        .get("publish_command")
        .and_then(TomlItem::as_value)
        .and_then(|v| v.as_array())
    {
        config.publish_command = array
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
    }
    config
}

fn config_from_lines(contents: &str) -> SetupConfig {
    let mut values: Vec<(&str, &str)> = Vec::new();
    for line in contents.lines() {
        let trimmed = line.trim_start();
        // Top-level keys only; stop at the first table header, even a malformed one.
        if trimmed.starts_with('[') {
            break;
        }
        let Some(line) = strip_toml_comment(trimmed) else {
            continue;
        };
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        values.push((key.trim(), value.trim()));
    }

    let lookup = |key: &str| {
        values
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    };
    let debug = match lookup("debug").and_then(|v| v.split_whitespace().next()) {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    };

    let mut config = config_from_scalars(
        |key| lookup(key).and_then(unquote).map(str::to_string),
        debug,
    );
    if let Some(value) = lookup("publish_command") {
        match parse_string_array(value) {
            Some(argv) => config.publish_command = argv,
            None => tracing::warn!(
                "ignoring publish_command `{value}`: expected a one-line array of strings"
            ),
        }
    }
    config
}

fn config_from_scalars(
    str_key: impl Fn(&str) -> Option<String>,
    debug: Option<bool>,
) -> SetupConfig {
    let package_name = str_key("package_name").unwrap_or_else(|| "utils".to_string());
    let mut config = SetupConfig::with_package_name(&package_name);
    if let Some(name) = str_key("name") {
        config.name = name;
    }
    if let Some(path) = str_key("version_file") {
        config.version_file = PathBuf::from(path);
    }
    if let Some(path) = str_key("version_module") {
        config.version_module = PathBuf::from(path);
    }
    if let Some(path) = str_key("utils_package") {
        config.utils_package = PathBuf::from(path);
    }
    if let Some(path) = str_key("requirements_file") {
        config.requirements_file = PathBuf::from(path);
    }
    if let Some(debug) = debug {
        config.debug = debug;
    }
    config
}

fn unquote(value: &str) -> Option<&str> {
    let value = value.trim();
    ['"', '\''].into_iter().find_map(|quote| {
        value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
    })
}

/// `["a", 'b']` on a single line; `None` for anything else.
fn parse_string_array(value: &str) -> Option<Vec<String>> {
    let mut rest = value.trim().strip_prefix('[')?.strip_suffix(']')?;
    let mut items = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Some(items);
        }
        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let body = &rest[1..];
        let end = body.find(quote)?;
        items.push(body[..end].to_string());
        rest = body[end + 1..].trim_start();
        if let Some(after_comma) = rest.strip_prefix(',') {
            rest = after_comma;
        } else if !rest.is_empty() {
            return None;
        }
    }
}

fn strip_toml_comment(line: &str) -> Option<&str> {
    let mut quote = None;
    let mut end = line.len();
    for (idx, ch) in line.char_indices() {
        match (quote, ch) {
            (None, '#') => {
                end = idx;
                break;
            }
            (None, '"' | '\'') => quote = Some(ch),
            (Some(open), _) if open == ch => quote = None,
            _ => {}
        }
    }
    let line = line[..end].trim();
    if line.is_empty() { None } else { Some(line) }
}

fn read_document_string(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(anyhow::Error::new(err).context(format!("read {CONFIG_FILE_NAME}"))),
    }
}

use std::io::ErrorKind;
use std::path::Path;

use crate::error::SetupError;

/// Requirement specifiers from a pip `requirements.txt`.
///
/// Comments, blank lines and pip options (`-r other.txt`, `--index-url ...`) are dropped. A
/// missing file means no requirements.
pub fn read_requirements(path: &Path) -> Result<Vec<String>, SetupError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("{} not found; no requirements", path.display());
            return Ok(Vec::new());
        }
        Err(err) => return Err(SetupError::io(format!("read {}", path.display()), err)),
    };

    Ok(parse_requirements(&contents))
}

pub fn parse_requirements(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| {
            let line = strip_comment(line).trim();
            if line.is_empty() || line.starts_with('-') {
                None
            } else {
                Some(line.to_string())
            }
        })
        .collect()
}

// pip only treats `#` as a comment at line start or after whitespace.
fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    match line.find(" #").or_else(|| line.find("\t#")) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

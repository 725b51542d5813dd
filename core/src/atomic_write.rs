use std::io::Read;
use std::io::Write as _;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::SetupError;

/// Mode of newly generated text files; an existing file keeps its own mode.
const DEFAULT_TEXT_MODE: u32 = 0o644;

/// Replaces `path` with `contents` in one step, creating missing parent directories.
///
/// A trailing newline is added when `contents` lacks one.
pub fn write_atomic_text(path: &Path, contents: &str) -> Result<(), SetupError> {
    let mode = existing_mode(path).unwrap_or(DEFAULT_TEXT_MODE);
    let mut tmp = temp_file_beside(path)?;
    tmp.write_all(contents.as_bytes())
        .map_err(|err| SetupError::io("write temp file", err))?;
    if !contents.ends_with('\n') {
        tmp.write_all(b"\n")
            .map_err(|err| SetupError::io("write temp newline", err))?;
    }
    set_mode(&tmp, path, mode)?;
    persist(tmp, path)
}

/// Streams `reader` into a temp file next to `path` and moves it into place with `mode`
/// permissions (Unix only). Returns the number of bytes written.
pub fn write_atomic_stream<R: Read>(
    path: &Path,
    reader: &mut R,
    mode: u32,
) -> Result<u64, SetupError> {
    let mut tmp = temp_file_beside(path)?;
    let written = std::io::copy(reader, &mut tmp).map_err(|source| SetupError::Decompress {
        path: path.to_path_buf(),
        source,
    })?;

    set_mode(&tmp, path, mode)?;
    persist(tmp, path)?;
    Ok(written)
}

// `NamedTempFile` creates files as 0600 regardless of umask.
#[cfg(unix)]
fn set_mode(tmp: &NamedTempFile, path: &Path, mode: u32) -> Result<(), SetupError> {
    use std::os::unix::fs::PermissionsExt as _;
    tmp.as_file()
        .set_permissions(std::fs::Permissions::from_mode(mode))
        .map_err(|err| SetupError::io(format!("set permissions on {}", path.display()), err))
}

#[cfg(not(unix))]
fn set_mode(_tmp: &NamedTempFile, _path: &Path, _mode: u32) -> Result<(), SetupError> {
    Ok(())
}

#[cfg(unix)]
fn existing_mode(path: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt as _;
    std::fs::metadata(path)
        .ok()
        .map(|meta| meta.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn existing_mode(_path: &Path) -> Option<u32> {
    None
}

fn temp_file_beside(path: &Path) -> Result<NamedTempFile, SetupError> {
    let Some(parent) = path.parent() else {
        return Err(SetupError::io(
            format!("invalid path for atomic write: {}", path.display()),
            std::io::Error::from(std::io::ErrorKind::InvalidInput),
        ));
    };
    // `Path::new("file").parent()` is `Some("")`.
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    std::fs::create_dir_all(parent)
        .map_err(|err| SetupError::io(format!("create {}", parent.display()), err))?;
    NamedTempFile::new_in(parent).map_err(|err| SetupError::io("create temp file", err))
}

fn persist(mut tmp: NamedTempFile, path: &Path) -> Result<(), SetupError> {
    tmp.flush()
        .map_err(|err| SetupError::io("flush temp file", err))?;
    tmp.persist(path).map_err(|err| {
        SetupError::io(format!("persist file to {}", path.display()), err.error)
    })?;
    Ok(())
}

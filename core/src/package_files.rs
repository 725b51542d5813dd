//! Enumerates the non-Python assets shipped inside the utils package.

use std::path::Path;
use std::path::PathBuf;

use ignore::WalkBuilder;

use crate::acquire::compressed_path;
use crate::acquire::gunzip_in_place;
use crate::bundled;
use crate::error::SetupError;
use crate::platform::Platform;

pub const REPORTING_DIR: &str = "reporting";
pub const REFERENCE_DATA_DIR: &str = "reference_data";

/// Build intermediates of the report templates that should not be shipped.
pub const REPORTING_SKIP_EXTS: &[&str] = &[".sass", ".coffee", ".map"];

/// Every file under `package_dir/subdir`, relative to `package_dir` and sorted.
///
/// Hidden files are included and ignore files are not consulted. A missing `subdir` yields no
/// files.
pub fn find_package_files(
    package_dir: &Path,
    subdir: &str,
    skip_exts: &[&str],
) -> Result<Vec<PathBuf>, SetupError> {
    let root = package_dir.join(subdir);
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkBuilder::new(&root).standard_filters(false).build() {
        let entry = entry.map_err(|err| {
            SetupError::io(
                format!("walk {}", root.display()),
                std::io::Error::other(err.to_string()),
            )
        })?;
        // `is_file` follows symlinks, so linked files are shipped too.
        if !entry.path().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if skip_exts.iter().any(|ext| name.ends_with(ext)) {
            continue;
        }

        if let Ok(relative) = entry.path().strip_prefix(package_dir) {
            files.push(relative.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Package data for the utils package: the platform's sambamba binary, the built bedtools
/// binaries (as a glob), report assets and reference data.
///
/// The sambamba binary must be on disk; a lone `.gz` copy is decompressed first.
pub fn utils_package_files(
    utils_dir: &Path,
    platform: Platform,
) -> Result<Vec<String>, SetupError> {
    let sambamba = bundled::sambamba_package_path(platform);
    ensure_bundled_file(&utils_dir.join(&sambamba))?;

    let mut files = vec![
        path_to_slash(&sambamba),
        format!("{}/bin/*", bundled::BEDTOOLS_DIR),
    ];
    for (subdir, skip_exts) in [
        (REPORTING_DIR, REPORTING_SKIP_EXTS),
        (REFERENCE_DATA_DIR, &[][..]),
    ] {
        files.extend(
            find_package_files(utils_dir, subdir, skip_exts)?
                .into_iter()
                .map(|path| path_to_slash(&path)),
        );
    }
    Ok(files)
}

fn ensure_bundled_file(path: &Path) -> Result<(), SetupError> {
    if path.is_file() {
        return Ok(());
    }
    let compressed = compressed_path(path);
    if compressed.is_file() {
        tracing::info!("gunzipping {}", compressed.display());
        return gunzip_in_place(&compressed, path);
    }
    Err(SetupError::MissingBundledFile {
        path: path.to_path_buf(),
    })
}

fn path_to_slash(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

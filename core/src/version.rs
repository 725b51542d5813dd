//! Version stamping: `VERSION.txt` + git revision -> generated version module.
//!
//! The release version lives in a plain text file. Significant changes are tagged and pushed
//! (`ngs-setup tag`), and every install/tag run regenerates the version module so the installed
//! package reports both the version and the commit it was built from.

use std::io::ErrorKind;
use std::path::Path;

use crate::atomic_write::write_atomic_text;
use crate::error::SetupError;
use crate::git::Git;

const GENERATED_HEADER: &str =
    "Do not edit this file, pipeline versioning is governed by git tags";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub version: String,
    pub revision_hash: String,
}

/// Source language of the generated module, picked from the output extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStyle {
    Python,
    Rust,
}

impl ArtifactStyle {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("rs") => ArtifactStyle::Rust,
            _ => ArtifactStyle::Python,
        }
    }

    pub fn render(self, record: &VersionRecord) -> String {
        match self {
            ArtifactStyle::Python => format!(
                "# {GENERATED_HEADER}\n__version__ = '{}'\n__git_revision__ = '{}'\n",
                python_escape(&record.version),
                python_escape(&record.revision_hash),
            ),
            ArtifactStyle::Rust => format!(
                "// {GENERATED_HEADER}\npub const VERSION: &str = {:?};\npub const GIT_REVISION: &str = {:?};\n",
                record.version, record.revision_hash,
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VersionStamper {
    git: Git,
}

impl VersionStamper {
    pub fn new(git: Git) -> Self {
        Self { git }
    }

    /// Reads the version, looks up the revision and rewrites `output_module` in full.
    pub fn stamp(
        &self,
        version_file: &Path,
        output_module: &Path,
    ) -> Result<VersionRecord, SetupError> {
        let version = read_version(version_file)?;
        let revision_hash = self.git.short_revision().into_hash();
        let record = VersionRecord {
            version,
            revision_hash,
        };

        let contents = ArtifactStyle::for_path(output_module).render(&record);
        write_atomic_text(output_module, &contents)?;
        tracing::debug!(
            version = %record.version,
            revision = %record.revision_hash,
            "wrote {}",
            output_module.display()
        );

        Ok(record)
    }
}

/// First line of `path`, trimmed.
pub fn read_version(path: &Path) -> Result<String, SetupError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(SetupError::MissingVersionFile {
                path: path.to_path_buf(),
            });
        }
        Err(err) => return Err(SetupError::io(format!("read {}", path.display()), err)),
    };

    let version = contents.trim().lines().next().unwrap_or_default().trim();
    if version.is_empty() {
        return Err(SetupError::MissingVersionFile {
            path: path.to_path_buf(),
        });
    }
    Ok(version.to_string())
}

fn python_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn offline_stamper(dir: &Path) -> VersionStamper {
        VersionStamper::new(Git::with_program(dir.join("missing-git"), dir))
    }

    #[test]
    fn only_the_first_line_is_the_version() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("VERSION.txt");
        std::fs::write(&path, "1.2.3\nextra").expect("write version");

        assert_eq!(read_version(&path).expect("read version"), "1.2.3");
    }

    #[test]
    fn leading_blank_lines_and_whitespace_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("VERSION.txt");
        std::fs::write(&path, "\n\n   0.9.1  \n").expect("write version");

        assert_eq!(read_version(&path).expect("read version"), "0.9.1");
    }

    #[test]
    fn missing_or_blank_version_file_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("VERSION.txt");

        let err = read_version(&path).expect_err("missing file");
        assert!(matches!(err, SetupError::MissingVersionFile { .. }));

        std::fs::write(&path, "  \n").expect("write blank");
        let err = read_version(&path).expect_err("blank file");
        assert!(matches!(err, SetupError::MissingVersionFile { .. }));
    }

    #[test]
    fn unreachable_git_still_writes_both_assignments() {
        let dir = tempfile::tempdir().expect("tempdir");
        let version_file = dir.path().join("VERSION.txt");
        let module = dir.path().join("pkg").join("version.py");
        std::fs::write(&version_file, "1.2.3\n").expect("write version");

        let record = offline_stamper(dir.path())
            .stamp(&version_file, &module)
            .expect("stamp");

        assert_eq!(
            record,
            VersionRecord {
                version: "1.2.3".to_string(),
                revision_hash: String::new(),
            }
        );
        assert_eq!(
            std::fs::read_to_string(&module).expect("read module"),
            "# Do not edit this file, pipeline versioning is governed by git tags\n\
             __version__ = '1.2.3'\n\
             __git_revision__ = ''\n"
        );
    }

    #[test]
    fn stamping_overwrites_previous_module() {
        let dir = tempfile::tempdir().expect("tempdir");
        let version_file = dir.path().join("VERSION.txt");
        let module = dir.path().join("version.py");
        std::fs::write(&module, "stale = True\n".repeat(20)).expect("seed module");
        std::fs::write(&version_file, "2.0\n").expect("write version");

        offline_stamper(dir.path())
            .stamp(&version_file, &module)
            .expect("stamp");

        let contents = std::fs::read_to_string(&module).expect("read module");
        assert!(!contents.contains("stale"));
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    #[cfg(unix)]
    fn stamped_module_stays_readable_by_everyone() {
        use std::os::unix::fs::PermissionsExt as _;

        let dir = tempfile::tempdir().expect("tempdir");
        let version_file = dir.path().join("VERSION.txt");
        let module = dir.path().join("pkg").join("version.py");
        std::fs::write(&version_file, "1.0\n").expect("write version");
        std::fs::create_dir_all(module.parent().expect("parent")).expect("create pkg");
        std::fs::write(&module, "").expect("seed module");
        std::fs::set_permissions(&module, std::fs::Permissions::from_mode(0o644))
            .expect("chmod");

        offline_stamper(dir.path())
            .stamp(&version_file, &module)
            .expect("stamp");

        let mode = std::fs::metadata(&module).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn rust_modules_get_const_items() {
        let record = VersionRecord {
            version: "1.0".to_string(),
            revision_hash: "abc1234".to_string(),
        };
        assert_eq!(
            ArtifactStyle::for_path(Path::new("src/version.rs")).render(&record),
            "// Do not edit this file, pipeline versioning is governed by git tags\n\
             pub const VERSION: &str = \"1.0\";\n\
             pub const GIT_REVISION: &str = \"abc1234\";\n"
        );
    }
}

use std::ffi::OsStr;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;

use crate::error::SetupError;

/// Outcome of asking git for the current short revision.
#[derive(Debug)]
pub enum RevisionLookup {
    Found(String),
    /// git is not installed or the directory is not a checkout.
    NotAvailable { reason: String },
    /// Anything else; still recoverable, but worth surfacing.
    Failed(SetupError),
}

impl RevisionLookup {
    pub fn into_hash(self) -> String {
        match self {
            RevisionLookup::Found(hash) => hash,
            RevisionLookup::NotAvailable { reason } => {
                tracing::debug!("no git revision: {reason}");
                String::new()
            }
            RevisionLookup::Failed(err) => {
                tracing::warn!("{err}; recording an empty revision");
                String::new()
            }
        }
    }
}

/// Thin wrapper around the `git` executable, scoped to one working directory.
#[derive(Debug, Clone)]
pub struct Git {
    program: OsString,
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self::with_program("git", workdir)
    }

    pub fn with_program(program: impl AsRef<OsStr>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            workdir: workdir.into(),
        }
    }

    pub fn short_revision(&self) -> RevisionLookup {
        let output = match Command::new(&self.program)
            .arg("-C")
            .arg(&self.workdir)
            .args(["rev-parse", "--short", "HEAD"])
            .output()
        {
            Ok(output) => output,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return RevisionLookup::NotAvailable {
                    reason: format!("`{}` not found", self.program.to_string_lossy()),
                };
            }
            Err(err) => {
                return RevisionLookup::Failed(SetupError::RevisionLookupFailed {
                    reason: format!("spawn `{}`: {err}", self.program.to_string_lossy()),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return RevisionLookup::NotAvailable {
                reason: if stderr.is_empty() {
                    format!("git exited with {}", output.status)
                } else {
                    stderr
                },
            };
        }

        let Ok(stdout) = String::from_utf8(output.stdout) else {
            return RevisionLookup::Failed(SetupError::RevisionLookupFailed {
                reason: "git printed a non-UTF-8 revision".to_string(),
            });
        };
        let hash = stdout.trim();
        if hash.is_empty() {
            return RevisionLookup::Failed(SetupError::RevisionLookupFailed {
                reason: "git printed an empty revision".to_string(),
            });
        }

        RevisionLookup::Found(hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use pretty_assertions::assert_eq;

    fn git_available() -> bool {
        Command::new("git").arg("--version").output().is_ok()
    }

    fn git(workdir: &Path, args: &[&str]) {
        assert!(
            Command::new("git")
                .arg("-C")
                .arg(workdir)
                .args(args)
                .status()
                .expect("run git")
                .success(),
            "git {args:?} failed"
        );
    }

    #[test]
    fn missing_program_is_not_available() {
        let dir = tempfile::tempdir().expect("tempdir");
        let git = Git::with_program(dir.path().join("no-such-git"), dir.path());

        let lookup = git.short_revision();
        assert!(
            matches!(lookup, RevisionLookup::NotAvailable { .. }),
            "unexpected lookup: {lookup:?}"
        );
        assert_eq!(lookup.into_hash(), "");
    }

    #[test]
    fn outside_a_checkout_is_not_available() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().expect("tempdir");

        let lookup = Git::new(dir.path()).short_revision();
        assert!(
            matches!(lookup, RevisionLookup::NotAvailable { .. }),
            "unexpected lookup: {lookup:?}"
        );
    }

    #[test]
    fn reads_short_revision_of_head() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().expect("tempdir");
        let workdir = dir.path();
        git(workdir, &["init", "-q"]);
        git(workdir, &["config", "user.name", "test"]);
        git(workdir, &["config", "user.email", "test@example.com"]);
        std::fs::write(workdir.join("README.md"), "hello\n").expect("write file");
        git(workdir, &["add", "."]);
        git(workdir, &["commit", "-q", "-m", "init"]);

        let hash = Git::new(workdir).short_revision().into_hash();
        assert!(hash.len() >= 4, "short hash too short: {hash:?}");
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

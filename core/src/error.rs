use std::ffi::OsString;
use std::path::PathBuf;

/// Failures raised while stamping versions and acquiring bundled tools.
///
/// `RevisionLookupFailed` and `CompilationFailed` are recoverable: callers log them and keep
/// going. The remaining variants abort the build.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("version file {} is missing or empty", path.display())]
    MissingVersionFile { path: PathBuf },

    #[error("git revision lookup failed: {reason}")]
    RevisionLookupFailed { reason: String },

    #[error("failed to compile {tool} ({}): {reason}", build_dir.display())]
    CompilationFailed {
        tool: String,
        build_dir: PathBuf,
        reason: String,
    },

    #[error(
        "could not find {tool}: not built in {} and not found on PATH",
        build_dir.display()
    )]
    ToolUnavailable {
        tool: String,
        build_dir: PathBuf,
        search_path: Option<OsString>,
    },

    #[error("bundled file {} is missing (checked for a .gz copy too)", path.display())]
    MissingBundledFile { path: PathBuf },

    #[error("decompress {}", path.display())]
    Decompress {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl SetupError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        SetupError::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether the build can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SetupError::RevisionLookupFailed { .. } | SetupError::CompilationFailed { .. }
        )
    }
}

//! Locating bundled binaries.
//!
//! A distribution can ship a tool as source, as a prebuilt binary or as a gzipped prebuilt binary.
//! [`ToolAcquirer`] walks an ordered list of [`ResolveStrategy`]s until one yields an existing,
//! executable file:
//!
//! 1. [`Prebuilt`]: required artifacts are already in place.
//! 2. [`Compile`]: run the tool's build command and re-check the artifacts.
//! 3. [`Decompress`]: gunzip `<artifact>.gz` in place.
//! 4. [`SystemSearch`]: first executable match on `PATH`.
//!
//! When every strategy passes, acquisition fails with [`SetupError::ToolUnavailable`].

use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use flate2::read::MultiGzDecoder;

use crate::atomic_write::write_atomic_stream;
use crate::error::SetupError;
use crate::tool::ToolDescriptor;

pub const COMPRESSED_SUFFIX: &str = ".gz";

const EXECUTABLE_MODE: u32 = 0o755;

/// Where a resolved binary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSource {
    Prebuilt,
    Compiled,
    Decompressed,
    SearchPath,
}

impl fmt::Display for ToolSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ToolSource::Prebuilt => "bundled",
            ToolSource::Compiled => "compiled",
            ToolSource::Decompressed => "decompressed",
            ToolSource::SearchPath => "PATH",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToolPath {
    pub path: PathBuf,
    pub source: ToolSource,
}

impl ResolvedToolPath {
    fn new(path: PathBuf, source: ToolSource) -> Self {
        Self { path, source }
    }
}

/// One step of the fallback chain.
///
/// `Ok(None)` means "not applicable, try the next step". Errors are logged by the acquirer and
/// treated the same way.
pub trait ResolveStrategy: fmt::Debug {
    fn name(&self) -> &'static str;

    fn resolve(&self, tool: &ToolDescriptor) -> Result<Option<ResolvedToolPath>, SetupError>;
}

#[derive(Debug)]
pub struct ToolAcquirer {
    strategies: Vec<Box<dyn ResolveStrategy>>,
    search_path: Option<OsString>,
}

impl ToolAcquirer {
    /// Standard chain, searching `search_path` (usually the value of `PATH`) last.
    pub fn new(search_path: Option<OsString>, cwd: PathBuf) -> Self {
        let strategies: Vec<Box<dyn ResolveStrategy>> = vec![
            Box::new(Prebuilt),
            Box::new(Compile),
            Box::new(Decompress),
            Box::new(SystemSearch::new(search_path.clone(), cwd)),
        ];
        Self {
            strategies,
            search_path,
        }
    }

    pub fn acquire(&self, tool: &ToolDescriptor) -> Result<ResolvedToolPath, SetupError> {
        for strategy in &self.strategies {
            match strategy.resolve(tool) {
                Ok(Some(resolved)) => {
                    tracing::info!(
                        tool = %tool.name,
                        source = %resolved.source,
                        "using {}",
                        resolved.path.display()
                    );
                    return Ok(resolved);
                }
                Ok(None) => {
                    tracing::debug!(tool = %tool.name, "{} not applicable", strategy.name());
                }
                Err(err) => {
                    tracing::warn!(tool = %tool.name, "{} failed: {err}", strategy.name());
                }
            }
        }

        Err(SetupError::ToolUnavailable {
            tool: tool.name.clone(),
            build_dir: tool.build_dir.clone(),
            search_path: self.search_path.clone(),
        })
    }
}

/// Required artifacts already exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prebuilt;

impl ResolveStrategy for Prebuilt {
    fn name(&self) -> &'static str {
        "prebuilt"
    }

    fn resolve(&self, tool: &ToolDescriptor) -> Result<Option<ResolvedToolPath>, SetupError> {
        Ok(usable_primary(tool).map(|path| ResolvedToolPath::new(path, ToolSource::Prebuilt)))
    }
}

/// Runs the tool's build command once, then re-checks the artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compile;

impl ResolveStrategy for Compile {
    fn name(&self) -> &'static str {
        "compile"
    }

    fn resolve(&self, tool: &ToolDescriptor) -> Result<Option<ResolvedToolPath>, SetupError> {
        let Some(command) = tool.build_command.as_deref() else {
            return Ok(None);
        };

        let failed = |reason: String| SetupError::CompilationFailed {
            tool: tool.name.clone(),
            build_dir: tool.build_dir.clone(),
            reason,
        };

        tracing::info!("Compiling {}", tool.name);
        tracing::info!("$ {}", command.describe(&tool.build_dir));
        let status = command
            .run(&tool.build_dir)
            .map_err(|err| failed(format!("spawn build command: {err}")))?;
        if !status.success() {
            return Err(failed(format!("build command exited with {status}")));
        }

        match usable_primary(tool) {
            Some(path) => Ok(Some(ResolvedToolPath::new(path, ToolSource::Compiled))),
            None => Err(failed(
                "build finished but required artifacts are missing".to_string(),
            )),
        }
    }
}

/// Unpacks `<primary>.gz` when only the compressed form is shipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decompress;

impl ResolveStrategy for Decompress {
    fn name(&self) -> &'static str {
        "decompress"
    }

    fn resolve(&self, tool: &ToolDescriptor) -> Result<Option<ResolvedToolPath>, SetupError> {
        let Some(primary) = tool.primary_artifact() else {
            return Ok(None);
        };
        let compressed = compressed_path(&primary);
        if primary.exists() || !compressed.is_file() {
            return Ok(None);
        }

        tracing::info!("gunzipping {} {}", tool.name, compressed.display());
        gunzip_in_place(&compressed, &primary)?;

        match check_executable(&primary) {
            Ok(()) => Ok(Some(ResolvedToolPath::new(
                primary,
                ToolSource::Decompressed,
            ))),
            Err(reason) => Err(SetupError::io(
                format!("decompressed {} is unusable", primary.display()),
                std::io::Error::other(reason),
            )),
        }
    }
}

/// First executable named `tool.executable_name` on the search path.
#[derive(Debug, Clone)]
pub struct SystemSearch {
    search_path: Option<OsString>,
    cwd: PathBuf,
}

impl SystemSearch {
    pub fn new(search_path: Option<OsString>, cwd: PathBuf) -> Self {
        Self { search_path, cwd }
    }
}

impl ResolveStrategy for SystemSearch {
    fn name(&self) -> &'static str {
        "search path"
    }

    fn resolve(&self, tool: &ToolDescriptor) -> Result<Option<ResolvedToolPath>, SetupError> {
        let Some(search_path) = self.search_path.as_ref() else {
            return Ok(None);
        };
        if search_path.is_empty() {
            return Ok(None);
        }

        let Ok(found) = which::which_in(&tool.executable_name, Some(search_path), &self.cwd) else {
            return Ok(None);
        };
        if let Err(reason) = check_executable(&found) {
            tracing::debug!("skipping {}: {reason}", found.display());
            return Ok(None);
        }

        Ok(Some(ResolvedToolPath::new(found, ToolSource::SearchPath)))
    }
}

pub fn compressed_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(COMPRESSED_SUFFIX);
    PathBuf::from(name)
}

/// Decompresses `compressed` into `target` and removes `compressed`, like `gunzip`.
pub fn gunzip_in_place(compressed: &Path, target: &Path) -> Result<(), SetupError> {
    let file = File::open(compressed).map_err(|source| SetupError::Decompress {
        path: compressed.to_path_buf(),
        source,
    })?;
    let mut decoder = MultiGzDecoder::new(file);
    let written = write_atomic_stream(target, &mut decoder, EXECUTABLE_MODE)?;
    std::fs::remove_file(compressed)
        .map_err(|err| SetupError::io(format!("remove {}", compressed.display()), err))?;

    tracing::debug!("decompressed {written} bytes into {}", target.display());
    Ok(())
}

fn usable_primary(tool: &ToolDescriptor) -> Option<PathBuf> {
    if !tool.artifacts_present() {
        return None;
    }
    let primary = tool.primary_artifact()?;
    match check_executable(&primary) {
        Ok(()) => Some(primary),
        Err(reason) => {
            tracing::debug!("{} present but {reason}", primary.display());
            None
        }
    }
}

/// Verifies that `path` is an executable regular file, returning a short reason otherwise.
pub fn check_executable(path: &Path) -> Result<(), String> {
    let meta = std::fs::metadata(path).map_err(|err| describe_metadata_error(&err))?;

    if !meta.is_file() {
        return Err("not a file".to_string());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        let mode = meta.permissions().mode();
        if mode & 0o111 == 0 {
            return Err("not executable".to_string());
        }
    }

    Ok(())
}

fn describe_metadata_error(err: &std::io::Error) -> String {
    match err.kind() {
        std::io::ErrorKind::NotFound => "does not exist".to_string(),
        std::io::ErrorKind::PermissionDenied => "permission denied".to_string(),
        _ => err.to_string(),
    }
}

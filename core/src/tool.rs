use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::ExitStatus;

/// Builds a bundled tool from the sources in its build directory.
pub trait BuildCommand: fmt::Debug {
    /// Human readable command line, echoed before the build runs.
    fn describe(&self, build_dir: &Path) -> String;

    fn run(&self, build_dir: &Path) -> std::io::Result<ExitStatus>;
}

/// `make -C <build_dir>`, inheriting stdout/stderr so compiler output stays visible.
#[derive(Debug, Clone, Default)]
pub struct MakeBuild {
    args: Vec<String>,
}

impl MakeBuild {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra arguments appended after `-C <dir>`, e.g. a target or `-j4`.
    pub fn with_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl BuildCommand for MakeBuild {
    fn describe(&self, build_dir: &Path) -> String {
        let mut parts = vec![
            "make".to_string(),
            "-C".to_string(),
            build_dir.display().to_string(),
        ];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    fn run(&self, build_dir: &Path) -> std::io::Result<ExitStatus> {
        Command::new("make")
            .arg("-C")
            .arg(build_dir)
            .args(&self.args)
            .status()
    }
}

/// Static description of one bundled binary.
#[derive(Debug)]
pub struct ToolDescriptor {
    pub name: String,
    /// Bare executable name looked up on `PATH` when nothing is bundled.
    pub executable_name: String,
    pub build_dir: PathBuf,
    /// Paths relative to `build_dir`; the first one is the executable to run.
    pub required_artifacts: Vec<PathBuf>,
    pub build_command: Option<Box<dyn BuildCommand>>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, build_dir: impl Into<PathBuf>) -> Self {
        let name = name.into();
        Self {
            executable_name: name.clone(),
            name,
            build_dir: build_dir.into(),
            required_artifacts: Vec::new(),
            build_command: None,
        }
    }

    pub fn executable_name(mut self, executable_name: impl Into<String>) -> Self {
        self.executable_name = executable_name.into();
        self
    }

    pub fn artifact(mut self, relative: impl Into<PathBuf>) -> Self {
        self.required_artifacts.push(relative.into());
        self
    }

    pub fn build_with(mut self, command: impl BuildCommand + 'static) -> Self {
        self.build_command = Some(Box::new(command));
        self
    }

    pub fn primary_artifact(&self) -> Option<PathBuf> {
        self.required_artifacts
            .first()
            .map(|relative| self.build_dir.join(relative))
    }

    pub fn artifact_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.required_artifacts
            .iter()
            .map(|relative| self.build_dir.join(relative))
    }

    pub fn artifacts_present(&self) -> bool {
        !self.required_artifacts.is_empty() && self.artifact_paths().all(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn primary_artifact_is_first_required_path() {
        let tool = ToolDescriptor::new("bedtools", "Utils/bedtools/bedtools2")
            .artifact("bin/bedtools")
            .artifact("bin/intersectBed");

        assert_eq!(
            tool.primary_artifact(),
            Some(PathBuf::from("Utils/bedtools/bedtools2/bin/bedtools"))
        );
        assert_eq!(tool.executable_name, "bedtools");
    }

    #[test]
    fn artifacts_present_requires_every_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tool = ToolDescriptor::new("tool", dir.path())
            .artifact("a")
            .artifact("b");
        std::fs::write(dir.path().join("a"), "").expect("write a");
        assert!(!tool.artifacts_present());

        std::fs::write(dir.path().join("b"), "").expect("write b");
        assert!(tool.artifacts_present());
    }

    #[test]
    fn descriptor_without_artifacts_is_never_present() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(!ToolDescriptor::new("tool", dir.path()).artifacts_present());
    }

    #[test]
    fn make_build_describes_directory_and_args() {
        let make = MakeBuild::with_args(["-j4"]);
        assert_eq!(make.describe(Path::new("src/tool")), "make -C src/tool -j4");
    }
}

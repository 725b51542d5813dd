use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use ngs_setup_core::Git;
use ngs_setup_core::Platform;
use ngs_setup_core::ResolvedToolPath;
use ngs_setup_core::ToolAcquirer;
use ngs_setup_core::VersionRecord;
use ngs_setup_core::VersionStamper;
use serde::Serialize;

use crate::action::Action;
use crate::config::SetupConfig;
use crate::housekeeping;
use crate::path_utils;

/// What a finished action produced.
#[derive(Debug)]
pub enum Outcome {
    Installed {
        record: VersionRecord,
        tools: Vec<(String, ResolvedToolPath)>,
    },
    Tagged(VersionRecord),
    Published,
    Updated,
    Cleaned(Vec<PathBuf>),
    Manifest(Manifest),
    PassedThrough(String),
}

/// Everything the packaging step needs to know about the distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub name: String,
    pub package_name: String,
    pub version: String,
    pub requirements: Vec<String>,
    pub package_files: Vec<String>,
}

pub struct Orchestrator {
    project_dir: PathBuf,
    config: SetupConfig,
    git: Git,
    search_path: Option<OsString>,
    platform: Platform,
}

impl Orchestrator {
    pub fn new(project_dir: PathBuf, config: SetupConfig) -> Self {
        Self {
            git: Git::new(&project_dir),
            search_path: std::env::var_os("PATH"),
            platform: Platform::detect(),
            project_dir,
            config,
        }
    }

    pub fn with_git(mut self, git: Git) -> Self {
        self.git = git;
        self
    }

    pub fn with_search_path(mut self, search_path: Option<OsString>) -> Self {
        self.search_path = search_path;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn run(&self, action: Action) -> anyhow::Result<Outcome> {
        tracing::debug!(
            project = %path_utils::display_short(&self.project_dir, None),
            "running {action:?}"
        );
        match action {
            Action::Install => self.install(),
            Action::Tag => self.tag().map(Outcome::Tagged),
            Action::Publish => self.publish().map(|()| Outcome::Published),
            Action::Up => self.up().map(|()| Outcome::Updated),
            Action::Clean => self.clean().map(Outcome::Cleaned),
            Action::Manifest => self.manifest().map(Outcome::Manifest),
            Action::PassThrough(token) => Ok(Outcome::PassedThrough(token)),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        path_utils::resolve_in(&self.project_dir, path)
    }

    fn stamp_version(&self) -> anyhow::Result<VersionRecord> {
        let stamper = VersionStamper::new(self.git.clone());
        Ok(stamper.stamp(
            &self.resolve(&self.config.version_file),
            &self.resolve(&self.config.version_module),
        )?)
    }

    fn install(&self) -> anyhow::Result<Outcome> {
        let record = self.stamp_version()?;
        println!(
            "-----------------------------------\n \
             Installing {} version {}\n\
             -----------------------------------\n",
            self.config.name, record.version
        );

        let acquirer = ToolAcquirer::new(self.search_path.clone(), self.project_dir.clone());
        let utils_dir = self.resolve(&self.config.utils_package);
        let mut tools = Vec::new();
        for tool in ngs_setup_core::bundled_tools(&utils_dir, self.platform) {
            let resolved = acquirer.acquire(&tool)?;
            tools.push((tool.name, resolved));
        }

        Ok(Outcome::Installed { record, tools })
    }

    fn tag(&self) -> anyhow::Result<VersionRecord> {
        let record = self.stamp_version()?;
        let version = record.version.as_str();
        let message = format!("Version {version}");
        housekeeping::run_command(
            &self.project_dir,
            &["git", "tag", "-a", version, "-m", message.as_str()],
        )?;
        housekeeping::run_command(&self.project_dir, &["git", "push", "--tags"])?;
        Ok(record)
    }

    fn publish(&self) -> anyhow::Result<()> {
        let argv: Vec<&str> = self
            .config
            .publish_command
            .iter()
            .map(String::as_str)
            .collect();
        if argv.is_empty() {
            anyhow::bail!("publish_command is empty in the project config");
        }
        housekeeping::run_command(&self.project_dir, &argv)
    }

    fn up(&self) -> anyhow::Result<()> {
        housekeeping::run_command(
            &self.project_dir,
            &["git", "pull", "--recurse-submodules", "--rebase"],
        )?;
        housekeeping::run_command(
            &self.project_dir,
            &[
                "git",
                "submodule",
                "foreach",
                "(git checkout master; git pull --rebase)",
            ],
        )
    }

    fn clean(&self) -> anyhow::Result<Vec<PathBuf>> {
        println!("Cleaning up binary, build and dist...");
        let removed = housekeeping::clean(&self.project_dir, &self.config.egg_info_dir())?;
        for dir in &removed {
            println!(
                "Removed {}",
                path_utils::display_short(dir, Some(&self.project_dir))
            );
        }
        println!("Done.");
        Ok(removed)
    }

    fn manifest(&self) -> anyhow::Result<Manifest> {
        let version = ngs_setup_core::read_version(&self.resolve(&self.config.version_file))?;
        let requirements =
            ngs_setup_core::read_requirements(&self.resolve(&self.config.requirements_file))?;
        let utils_dir = self.resolve(&self.config.utils_package);
        let package_files = ngs_setup_core::utils_package_files(&utils_dir, self.platform)
            .with_context(|| format!("list package files under {}", utils_dir.display()))?;

        Ok(Manifest {
            name: self.config.name.clone(),
            package_name: self.config.package_name.clone(),
            version,
            requirements,
            package_files,
        })
    }
}

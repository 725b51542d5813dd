//! Install-time helpers for the NGS toolkit distribution: version stamping and acquisition of the
//! bundled third-party binaries (bedtools, sambamba).

// Library code reports through `tracing`; the binary owns stdout/stderr.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod acquire;
mod atomic_write;
mod bundled;
mod error;
mod git;
mod package_files;
mod platform;
mod requirements;
mod tool;
mod version;

pub use acquire::COMPRESSED_SUFFIX;
pub use acquire::Compile;
pub use acquire::Decompress;
pub use acquire::Prebuilt;
pub use acquire::ResolveStrategy;
pub use acquire::ResolvedToolPath;
pub use acquire::SystemSearch;
pub use acquire::ToolAcquirer;
pub use acquire::ToolSource;
pub use acquire::check_executable;
pub use acquire::compressed_path;
pub use acquire::gunzip_in_place;
pub use atomic_write::write_atomic_text;
pub use bundled::bedtools;
pub use bundled::bundled_tools;
pub use bundled::sambamba;
pub use error::SetupError;
pub use git::Git;
pub use git::RevisionLookup;
pub use package_files::find_package_files;
pub use package_files::utils_package_files;
pub use platform::Platform;
pub use requirements::parse_requirements;
pub use requirements::read_requirements;
pub use tool::BuildCommand;
pub use tool::MakeBuild;
pub use tool::ToolDescriptor;
pub use version::ArtifactStyle;
pub use version::VersionRecord;
pub use version::VersionStamper;
pub use version::read_version;

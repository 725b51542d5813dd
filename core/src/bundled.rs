use std::path::Path;
use std::path::PathBuf;

use crate::platform::Platform;
use crate::tool::MakeBuild;
use crate::tool::ToolDescriptor;

pub const BEDTOOLS_DIR: &str = "bedtools/bedtools2";
pub const SAMBAMBA_DIR: &str = "sambamba_binaries";

/// bedtools ships as source and is built with `make`.
pub fn bedtools(utils_dir: &Path) -> ToolDescriptor {
    ToolDescriptor::new("bedtools", utils_dir.join(BEDTOOLS_DIR))
        .artifact(Path::new("bin").join("bedtools"))
        .build_with(MakeBuild::new())
}

/// sambamba ships as a per-platform binary, optionally gzipped.
pub fn sambamba(utils_dir: &Path, platform: Platform) -> ToolDescriptor {
    ToolDescriptor::new("sambamba", utils_dir.join(SAMBAMBA_DIR))
        .artifact(platform.sambamba_binary())
}

/// Every bundled tool, in acquisition order.
pub fn bundled_tools(utils_dir: &Path, platform: Platform) -> Vec<ToolDescriptor> {
    vec![bedtools(utils_dir), sambamba(utils_dir, platform)]
}

/// Path of the platform's sambamba binary relative to the utils package.
pub fn sambamba_package_path(platform: Platform) -> PathBuf {
    Path::new(SAMBAMBA_DIR).join(platform.sambamba_binary())
}

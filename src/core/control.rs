//! Run configuration
//!
//! [`ControlData`] is the single source of truth for one orchestration run:
//! root directory, build type, platform, toolchain toggles, revision
//! selection. It is constructed once from the parsed command line and passed
//! by reference to every component and builder — immutable after
//! construction, no globals.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::config::defaults;
use crate::error::ConfigError;

/// CMake build type. Construction from a string rejects anything outside
/// the four enumerated values before any path or command is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BuildType {
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    /// The name cmake expects in `CMAKE_BUILD_TYPE`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Debug" => Ok(Self::Debug),
            "Release" => Ok(Self::Release),
            "RelWithDebInfo" => Ok(Self::RelWithDebInfo),
            "MinSizeRel" => Ok(Self::MinSizeRel),
            other => Err(ConfigError::InvalidBuildType {
                value: other.to_string(),
            }),
        }
    }
}

/// Host platform, as far as command planning is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Platform {
    Linux,
    Darwin,
    Windows,
}

impl Platform {
    /// Detect the platform stackforge is running on
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Self::Darwin,
            "windows" => Self::Windows,
            _ => Self::Linux,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linux => "Linux",
            Self::Darwin => "Darwin",
            Self::Windows => "Windows",
        };
        f.write_str(name)
    }
}

/// Raw, unvalidated inputs for [`ControlData`], as collected from the CLI
#[derive(Debug, Clone)]
pub struct ControlOptions {
    /// Base directory for all checkouts and builds
    pub root_dir: Option<PathBuf>,
    /// Requested build type for the application component
    pub build_type: String,
    /// Build external libraries with the requested build type instead of Release
    pub debug_externals: bool,
    /// Parallelism handed to the native build tool
    pub threads: Option<usize>,
    /// Release tag; takes precedence over branch-based checkout
    pub git_tag: Option<String>,
    /// Branch checked out when no tag is given
    pub main_branch: String,
    /// Link statically
    pub static_link: bool,
    /// 32-bit build
    pub b32: bool,
    /// Use the Xcode generator (Darwin)
    pub xcode: bool,
    /// Use jom instead of nmake (Windows)
    pub jom: bool,
    /// Use the Ninja generator
    pub ninja: bool,
    /// Dry-run mode: log commands without executing them
    pub dummy: bool,
    /// Comma-separated `component=folder` build-folder overrides
    pub build_folder_overrides: Option<String>,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            root_dir: None,
            build_type: BuildType::Release.to_string(),
            debug_externals: false,
            threads: None,
            git_tag: None,
            main_branch: defaults::DEFAULT_MAIN_BRANCH.to_string(),
            static_link: false,
            b32: false,
            xcode: false,
            jom: false,
            ninja: false,
            dummy: false,
            build_folder_overrides: None,
        }
    }
}

/// Immutable configuration record shared by all components in a run
#[derive(Debug, Clone)]
pub struct ControlData {
    /// Base directory for all checkouts and builds
    pub root_dir: PathBuf,
    /// Build type for the application component
    pub build_type: BuildType,
    /// Build type for external libraries (Release unless --debug-externals)
    pub external_build_type: BuildType,
    /// Host platform
    pub platform: Platform,
    /// Link statically
    pub static_link: bool,
    /// 32-bit build
    pub b32: bool,
    /// Use the Xcode generator
    pub xcode: bool,
    /// Use jom instead of nmake
    pub jom: bool,
    /// Use the Ninja generator
    pub ninja: bool,
    /// Parallelism handed to the native build tool (always >= 1)
    pub threads: usize,
    /// Release tag; takes precedence over branch-based checkout
    pub git_tag: Option<String>,
    /// Branch checked out when no tag is given
    pub main_branch: String,
    /// Dry-run mode
    pub dummy: bool,
    overrides: HashMap<String, String>,
}

impl ControlData {
    /// Validate the raw options and build the configuration record.
    ///
    /// Fails before any path or command is derived when the build type is
    /// outside the enumerated set, the thread count is zero, or an override
    /// entry is malformed.
    pub fn from_options(opts: ControlOptions) -> Result<Self, ConfigError> {
        let build_type = BuildType::from_str(&opts.build_type)?;

        let threads = match opts.threads {
            Some(0) => return Err(ConfigError::InvalidThreads { value: 0 }),
            Some(n) => n,
            None => num_cpus::get().max(1),
        };

        let root_dir = match opts.root_dir {
            Some(dir) => dir,
            None => dirs::home_dir()
                .map(|home| home.join(defaults::DEFAULT_ROOT_DIRNAME))
                .ok_or(ConfigError::NoRootDir)?,
        };

        let overrides = parse_overrides(opts.build_folder_overrides.as_deref())?;

        let external_build_type = if opts.debug_externals {
            build_type
        } else {
            BuildType::Release
        };

        Ok(Self {
            root_dir,
            build_type,
            external_build_type,
            platform: Platform::current(),
            static_link: opts.static_link,
            b32: opts.b32,
            xcode: opts.xcode,
            jom: opts.jom,
            ninja: opts.ninja,
            threads,
            git_tag: opts.git_tag,
            main_branch: opts.main_branch,
            dummy: opts.dummy,
            overrides,
        })
    }

    /// The effective build type for a component
    pub fn build_type_for(&self, external: bool) -> BuildType {
        if external {
            self.external_build_type
        } else {
            self.build_type
        }
    }

    /// Derive the build-directory name for a component.
    ///
    /// An explicit override wins. Otherwise the name is composed of ordered
    /// fragments, one per active flag, so that two runs with different flags
    /// never share a build directory:
    /// `build[32]_<BuildType>[_static][_xcode][_jom][_ninja]`.
    pub fn build_folder(&self, component: &str, build_type: BuildType) -> String {
        if let Some(folder) = self.overrides.get(component) {
            return folder.clone();
        }
        let mut folder = String::from("build");
        if self.b32 {
            folder.push_str("32");
        }
        folder.push('_');
        folder.push_str(build_type.as_str());
        if self.static_link {
            folder.push_str("_static");
        }
        if self.xcode {
            folder.push_str("_xcode");
        }
        if self.jom {
            folder.push_str("_jom");
        }
        if self.ninja {
            folder.push_str("_ninja");
        }
        folder
    }

    /// Directory holding one component's checkout and build trees
    pub fn component_dir(&self, component: &str) -> PathBuf {
        self.root_dir.join(component)
    }
}

fn parse_overrides(raw: Option<&str>) -> Result<HashMap<String, String>, ConfigError> {
    let mut overrides = HashMap::new();
    let Some(raw) = raw else {
        return Ok(overrides);
    };
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((name, folder)) = entry.split_once('=') else {
            return Err(ConfigError::InvalidOverride {
                entry: entry.to_string(),
            });
        };
        if name.is_empty() || folder.is_empty() {
            return Err(ConfigError::InvalidOverride {
                entry: entry.to_string(),
            });
        }
        overrides.insert(name.to_string(), folder.to_string());
    }
    Ok(overrides)
}

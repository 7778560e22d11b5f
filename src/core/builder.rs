//! Native build-tool command assembly
//!
//! Components do not assemble shell strings. They describe a cmake
//! configure run through [`CMakeCommand`] and a native build/clean run
//! through [`NativeBuild`]; both render to a structured
//! [`CommandSpec`] that the process runner executes.

use std::path::{Path, PathBuf};

use crate::core::control::{BuildType, ControlData, Platform};
use crate::infra::process::CommandSpec;

/// CMake generator, derived from platform and toolchain toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    UnixMakefiles,
    Ninja,
    Xcode,
    NMake,
    NMakeJom,
}

impl Generator {
    /// Pick the generator for this run.
    ///
    /// `--ninja` wins everywhere; `--xcode` applies on Darwin; Windows
    /// dispatches to jom or nmake; everything else uses Unix makefiles.
    pub fn select(ctl: &ControlData) -> Self {
        if ctl.ninja {
            return Self::Ninja;
        }
        match ctl.platform {
            Platform::Darwin if ctl.xcode => Self::Xcode,
            Platform::Windows => {
                if ctl.jom {
                    Self::NMakeJom
                } else {
                    Self::NMake
                }
            }
            _ => Self::UnixMakefiles,
        }
    }

    /// The name cmake expects after `-G`
    pub fn cmake_name(&self) -> &'static str {
        match self {
            Self::UnixMakefiles => "Unix Makefiles",
            Self::Ninja => "Ninja",
            Self::Xcode => "Xcode",
            Self::NMake => "NMake Makefiles",
            Self::NMakeJom => "NMake Makefiles JOM",
        }
    }

    /// The native tool this generator emits build files for
    pub fn build_tool(&self) -> &'static str {
        match self {
            Self::UnixMakefiles => "make",
            Self::Ninja => "ninja",
            Self::Xcode => "xcodebuild",
            Self::NMake => "nmake",
            Self::NMakeJom => "jom",
        }
    }
}

/// One cmake configure invocation being assembled
#[derive(Debug, Clone)]
pub struct CMakeCommand {
    generator: Generator,
    build_type: BuildType,
    source_dir: PathBuf,
    build_dir: PathBuf,
    defines: Vec<(String, String)>,
}

impl CMakeCommand {
    /// Start a configure invocation for the given source and build trees
    pub fn new(
        generator: Generator,
        build_type: BuildType,
        source_dir: PathBuf,
        build_dir: PathBuf,
    ) -> Self {
        Self {
            generator,
            build_type,
            source_dir,
            build_dir,
            defines: Vec::new(),
        }
    }

    /// Set a `-D` cache define, replacing any earlier value for the key
    pub fn set_define(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.defines.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.defines.push((key, value));
        }
    }

    /// Builder-style [`Self::set_define`]
    #[must_use]
    pub fn with_define(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_define(key, value);
        self
    }

    /// Append an entry to a semicolon-separated cmake list define
    pub fn append_list_entry(&mut self, key: impl Into<String>, entry: impl Into<String>) {
        let key = key.into();
        let entry = entry.into();
        if let Some(existing) = self.defines.iter_mut().find(|(k, _)| *k == key) {
            existing.1.push(';');
            existing.1.push_str(&entry);
        } else {
            self.defines.push((key, entry));
        }
    }

    /// Current value of a define, if set
    pub fn define(&self, key: &str) -> Option<&str> {
        self.defines
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The build tree this invocation configures into
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Render the configure run as an executable command
    pub fn render(&self) -> CommandSpec {
        let mut spec = CommandSpec::new("cmake")
            .arg("-G")
            .arg(self.generator.cmake_name())
            .arg(format!("-DCMAKE_BUILD_TYPE={}", self.build_type));
        for (key, value) in &self.defines {
            spec = spec.arg(format!("-D{key}={value}"));
        }
        spec.arg(self.source_dir.display().to_string())
            .current_dir(&self.build_dir)
    }
}

/// Build/clean invocations for the generator's native tool
pub struct NativeBuild;

impl NativeBuild {
    /// The build invocation, with `-j`-style parallelism where the tool
    /// supports it
    pub fn build(ctl: &ControlData, build_dir: &Path, build_type: BuildType) -> CommandSpec {
        let generator = Generator::select(ctl);
        let spec = CommandSpec::new(generator.build_tool()).current_dir(build_dir);
        match generator {
            Generator::UnixMakefiles => spec.args(["-j".to_string(), ctl.threads.to_string()]),
            Generator::Ninja => spec.args(["-j".to_string(), ctl.threads.to_string()]),
            Generator::NMakeJom => spec.args(["/J".to_string(), ctl.threads.to_string()]),
            Generator::NMake => spec,
            Generator::Xcode => spec.args(["-configuration", build_type.as_str()]),
        }
    }

    /// The clean invocation
    pub fn clean(ctl: &ControlData, build_dir: &Path) -> CommandSpec {
        let generator = Generator::select(ctl);
        let spec = CommandSpec::new(generator.build_tool()).current_dir(build_dir);
        match generator {
            Generator::Ninja => spec.args(["-t", "clean"]),
            _ => spec.arg("clean"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::control::ControlOptions;

    fn control() -> ControlData {
        ControlData::from_options(ControlOptions {
            root_dir: Some(PathBuf::from("/work/dev")),
            threads: Some(8),
            ..ControlOptions::default()
        })
        .unwrap()
    }

    // ============================================
    // Unit Tests - Generator selection
    // ============================================

    #[test]
    fn test_ninja_toggle_wins_everywhere() {
        let mut ctl = control();
        ctl.ninja = true;
        ctl.xcode = true;
        for platform in [Platform::Linux, Platform::Darwin, Platform::Windows] {
            ctl.platform = platform;
            assert_eq!(Generator::select(&ctl), Generator::Ninja);
        }
    }

    #[test]
    fn test_xcode_only_applies_on_darwin() {
        let mut ctl = control();
        ctl.xcode = true;
        ctl.platform = Platform::Darwin;
        assert_eq!(Generator::select(&ctl), Generator::Xcode);
        ctl.platform = Platform::Linux;
        assert_eq!(Generator::select(&ctl), Generator::UnixMakefiles);
    }

    #[test]
    fn test_windows_dispatches_nmake_or_jom() {
        let mut ctl = control();
        ctl.platform = Platform::Windows;
        assert_eq!(Generator::select(&ctl), Generator::NMake);
        ctl.jom = true;
        assert_eq!(Generator::select(&ctl), Generator::NMakeJom);
    }

    // ============================================
    // Unit Tests - CMakeCommand
    // ============================================

    #[test]
    fn test_cmake_render_shape() {
        let cmd = CMakeCommand::new(
            Generator::UnixMakefiles,
            BuildType::Release,
            PathBuf::from("/work/dev/vtk/src"),
            PathBuf::from("/work/dev/vtk/build_Release"),
        )
        .with_define("BUILD_TESTING", "OFF");
        let spec = cmd.render();
        assert_eq!(spec.program, "cmake");
        assert_eq!(
            spec.args,
            vec![
                "-G",
                "Unix Makefiles",
                "-DCMAKE_BUILD_TYPE=Release",
                "-DBUILD_TESTING=OFF",
                "/work/dev/vtk/src",
            ]
        );
        assert_eq!(spec.cwd.as_deref(), Some(Path::new("/work/dev/vtk/build_Release")));
    }

    #[test]
    fn test_set_define_last_write_wins() {
        let mut cmd = CMakeCommand::new(
            Generator::Ninja,
            BuildType::Debug,
            PathBuf::from("/s"),
            PathBuf::from("/b"),
        );
        cmd.set_define("BUILD_SHARED_LIBS", "ON");
        cmd.set_define("BUILD_SHARED_LIBS", "OFF");
        assert_eq!(cmd.define("BUILD_SHARED_LIBS"), Some("OFF"));
        let rendered = cmd.render();
        let count = rendered
            .args
            .iter()
            .filter(|a| a.starts_with("-DBUILD_SHARED_LIBS="))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_append_list_entry_joins_with_semicolons() {
        let mut cmd = CMakeCommand::new(
            Generator::Ninja,
            BuildType::Release,
            PathBuf::from("/s"),
            PathBuf::from("/b"),
        );
        cmd.append_list_entry("EXTERNAL_PLUGINS", "/p/one");
        cmd.append_list_entry("EXTERNAL_PLUGINS", "/p/two");
        assert_eq!(cmd.define("EXTERNAL_PLUGINS"), Some("/p/one;/p/two"));
    }

    // ============================================
    // Unit Tests - NativeBuild
    // ============================================

    #[test]
    fn test_make_build_carries_thread_count() {
        let mut ctl = control();
        ctl.platform = Platform::Linux;
        let spec = NativeBuild::build(&ctl, Path::new("/b"), BuildType::Release);
        assert_eq!(spec.program, "make");
        assert_eq!(spec.args, vec!["-j", "8"]);
    }

    #[test]
    fn test_jom_build_uses_slash_j() {
        let mut ctl = control();
        ctl.platform = Platform::Windows;
        ctl.jom = true;
        let spec = NativeBuild::build(&ctl, Path::new("/b"), BuildType::Release);
        assert_eq!(spec.program, "jom");
        assert_eq!(spec.args, vec!["/J", "8"]);
    }

    #[test]
    fn test_ninja_clean_uses_clean_tool() {
        let mut ctl = control();
        ctl.ninja = true;
        let spec = NativeBuild::clean(&ctl, Path::new("/b"));
        assert_eq!(spec.program, "ninja");
        assert_eq!(spec.args, vec!["-t", "clean"]);
    }

    #[test]
    fn test_make_clean_uses_clean_target() {
        let mut ctl = control();
        ctl.platform = Platform::Linux;
        let spec = NativeBuild::clean(&ctl, Path::new("/b"));
        assert_eq!(spec.program, "make");
        assert_eq!(spec.args, vec!["clean"]);
    }
}

//! The component catalog
//!
//! The fixed, hand-enumerated stack behind the navapp platform: seven
//! external CMake libraries, two source-only application plugins, and the
//! umbrella application itself. Registration order doubles as the build
//! order within a phase and is kept topologically valid on purpose.

use crate::config::{defaults, urls};
use crate::core::assembly::LibraryAssembly;
use crate::core::builder::{CMakeCommand, Generator, NativeBuild};
use crate::core::component::{Component, RunContext};
use crate::core::control::ControlData;
use crate::error::ComponentError;
use crate::infra::git::GitRef;
use crate::infra::process::run_checked;
use crate::infra::{fs, git};

/// A configure-time link to a sibling: the sibling's config path is
/// injected under the given cmake define
#[derive(Debug, Clone, Copy)]
pub struct DependencyLink {
    pub component: &'static str,
    pub define: &'static str,
}

const ITK_LINKS: &[DependencyLink] = &[DependencyLink {
    component: "vtk",
    define: "VTK_DIR",
}];

const CTK_LINKS: &[DependencyLink] = &[
    DependencyLink {
        component: "vtk",
        define: "VTK_DIR",
    },
    DependencyLink {
        component: "itk",
        define: "ITK_DIR",
    },
];

const FAST_LINKS: &[DependencyLink] = &[
    DependencyLink {
        component: "eigen",
        define: "Eigen3_DIR",
    },
    DependencyLink {
        component: "opencv",
        define: "OpenCV_DIR",
    },
];

const APP_LINKS: &[DependencyLink] = &[
    DependencyLink {
        component: "eigen",
        define: "Eigen3_DIR",
    },
    DependencyLink {
        component: "vtk",
        define: "VTK_DIR",
    },
    DependencyLink {
        component: "itk",
        define: "ITK_DIR",
    },
    DependencyLink {
        component: "opencv",
        define: "OpenCV_DIR",
    },
    DependencyLink {
        component: "openigtlink",
        define: "OpenIGTLink_DIR",
    },
    DependencyLink {
        component: "ctk",
        define: "CTK_DIR",
    },
    DependencyLink {
        component: "fast",
        define: "FAST_DIR",
    },
];

/// Shared configure skeleton: generator, build type, shared/static
/// linkage, 32-bit flags
fn base_cmake(component: &dyn Component, ctx: &RunContext) -> CMakeCommand {
    let ctl = ctx.control;
    let mut cmake = CMakeCommand::new(
        Generator::select(ctl),
        component.build_type(ctl),
        component.source_dir(ctl),
        component.build_dir(ctl),
    );
    cmake.set_define(
        "BUILD_SHARED_LIBS",
        if ctl.static_link { "OFF" } else { "ON" },
    );
    if ctl.b32 {
        cmake.set_define("CMAKE_C_FLAGS", "-m32");
        cmake.set_define("CMAKE_CXX_FLAGS", "-m32");
    }
    cmake
}

/// Inject each linked sibling's config path
fn link_siblings(
    cmake: &mut CMakeCommand,
    component: &str,
    links: &[DependencyLink],
    ctx: &RunContext,
) -> Result<(), ComponentError> {
    for link in links {
        let path = ctx
            .siblings
            .config_path(link.component, ctx.control)
            .ok_or_else(|| ComponentError::MissingSibling {
                component: component.to_string(),
                dependency: link.component.to_string(),
            })?;
        cmake.set_define(link.define, path.display().to_string());
    }
    Ok(())
}

/// Create the build tree and run the assembled configure invocation
fn run_configure(cmake: &CMakeCommand, ctx: &RunContext) -> Result<(), ComponentError> {
    if !ctx.runner.dry_run() {
        fs::ensure_dir(cmake.build_dir()).map_err(|e| ComponentError::Io {
            path: cmake.build_dir().to_path_buf(),
            error: e.to_string(),
        })?;
    }
    run_checked(ctx.runner, &cmake.render())?;
    Ok(())
}

fn native_build(component: &dyn Component, ctx: &RunContext) -> Result<(), ComponentError> {
    let ctl = ctx.control;
    let spec = NativeBuild::build(ctl, &component.build_dir(ctl), component.build_type(ctl));
    run_checked(ctx.runner, &spec)?;
    Ok(())
}

fn native_clean(component: &dyn Component, ctx: &RunContext) -> Result<(), ComponentError> {
    let ctl = ctx.control;
    let build_dir = component.build_dir(ctl);
    if !ctx.runner.dry_run() && !build_dir.exists() {
        tracing::debug!(component = component.name(), "no build tree, nothing to clean");
        return Ok(());
    }
    run_checked(ctx.runner, &NativeBuild::clean(ctl, &build_dir))?;
    Ok(())
}

fn reset_tree(component: &dyn Component, ctx: &RunContext) -> Result<(), ComponentError> {
    let build_dir = component.build_dir(ctx.control);
    if ctx.runner.dry_run() {
        println!("[dry-run] remove {}", build_dir.display());
        return Ok(());
    }
    fs::remove_tree(&build_dir).map_err(|e| ComponentError::Io {
        path: build_dir,
        error: e.to_string(),
    })
}

fn vcs_checkout(component: &dyn Component, url: &str, ctx: &RunContext) -> Result<(), ComponentError> {
    git::checkout(
        ctx.runner,
        url,
        &component.target_ref(ctx.control),
        &component.source_dir(ctx.control),
    )?;
    Ok(())
}

fn vcs_update(component: &dyn Component, ctx: &RunContext) -> Result<(), ComponentError> {
    git::update(
        ctx.runner,
        &component.target_ref(ctx.control),
        &component.source_dir(ctx.control),
    )?;
    Ok(())
}

/// An external library driven by cmake and pinned to an exact revision
pub struct CMakeComponent {
    name: &'static str,
    repository: &'static str,
    pinned: GitRef,
    defines: &'static [(&'static str, &'static str)],
    links: &'static [DependencyLink],
    dep_names: Vec<&'static str>,
}

impl CMakeComponent {
    fn new(
        name: &'static str,
        repository: &'static str,
        pinned: GitRef,
        defines: &'static [(&'static str, &'static str)],
        links: &'static [DependencyLink],
    ) -> Self {
        let dep_names = links.iter().map(|l| l.component).collect();
        Self {
            name,
            repository,
            pinned,
            defines,
            links,
            dep_names,
        }
    }

    pub fn eigen() -> Self {
        Self::new(
            "eigen",
            urls::EIGEN_REPO,
            GitRef::Tag("3.4.0".to_string()),
            &[("BUILD_TESTING", "OFF")],
            &[],
        )
    }

    pub fn vtk() -> Self {
        Self::new(
            "vtk",
            urls::VTK_REPO,
            GitRef::Tag("v9.2.6".to_string()),
            &[
                ("VTK_BUILD_TESTING", "OFF"),
                ("VTK_BUILD_EXAMPLES", "OFF"),
            ],
            &[],
        )
    }

    pub fn itk() -> Self {
        Self::new(
            "itk",
            urls::ITK_REPO,
            GitRef::Tag("v5.3.0".to_string()),
            &[("BUILD_TESTING", "OFF"), ("Module_ITKVtkGlue", "ON")],
            ITK_LINKS,
        )
    }

    pub fn opencv() -> Self {
        Self::new(
            "opencv",
            urls::OPENCV_REPO,
            GitRef::Tag("4.8.0".to_string()),
            &[("BUILD_TESTS", "OFF"), ("BUILD_PERF_TESTS", "OFF")],
            &[],
        )
    }

    pub fn openigtlink() -> Self {
        Self::new(
            "openigtlink",
            urls::OPENIGTLINK_REPO,
            GitRef::Tag("v3.0".to_string()),
            &[("BUILD_TESTING", "OFF")],
            &[],
        )
    }

    pub fn ctk() -> Self {
        Self::new(
            "ctk",
            urls::CTK_REPO,
            // CTK has no tagged release new enough; pinned to a commit
            GitRef::Rev("88a40598a1b47e0a6d58edabbcaf1e9fe07eff8e".to_string()),
            &[("CTK_BUILD_QT_DESIGNER_PLUGINS", "OFF")],
            CTK_LINKS,
        )
    }

    pub fn fast() -> Self {
        Self::new(
            "fast",
            urls::FAST_REPO,
            GitRef::Tag("v4.7.0".to_string()),
            &[
                ("FAST_BUILD_TESTS", "OFF"),
                ("FAST_BUILD_EXAMPLES", "OFF"),
            ],
            FAST_LINKS,
        )
    }
}

impl Component for CMakeComponent {
    fn name(&self) -> &str {
        self.name
    }

    fn repository(&self) -> Option<&str> {
        Some(self.repository)
    }

    fn pinned_ref(&self) -> Option<&GitRef> {
        Some(&self.pinned)
    }

    fn dependencies(&self) -> &[&'static str] {
        &self.dep_names
    }

    fn checkout(&self, ctx: &RunContext) -> Result<(), ComponentError> {
        vcs_checkout(self, self.repository, ctx)
    }

    fn update(&self, ctx: &RunContext) -> Result<(), ComponentError> {
        vcs_update(self, ctx)
    }

    fn configure(&self, ctx: &RunContext) -> Result<(), ComponentError> {
        let mut cmake = base_cmake(self, ctx);
        for (key, value) in self.defines {
            cmake.set_define(*key, *value);
        }
        link_siblings(&mut cmake, self.name, self.links, ctx)?;
        run_configure(&cmake, ctx)
    }

    fn build(&self, ctx: &RunContext) -> Result<(), ComponentError> {
        native_build(self, ctx)
    }

    fn make_clean(&self, ctx: &RunContext) -> Result<(), ComponentError> {
        native_clean(self, ctx)
    }

    fn reset(&self, ctx: &RunContext) -> Result<(), ComponentError> {
        reset_tree(self, ctx)
    }
}

/// A source-only application plugin: checked out alongside the platform
/// and wired into the umbrella component's configure run, never
/// configured or built on its own
pub struct PluginComponent {
    name: &'static str,
    repository: &'static str,
    switch: &'static str,
}

impl PluginComponent {
    pub fn us_reconstruction() -> Self {
        Self {
            name: "plugin-us-reconstruction",
            repository: urls::PLUGIN_US_RECONSTRUCTION_REPO,
            switch: "NAVAPP_PLUGIN_US_RECONSTRUCTION",
        }
    }

    pub fn registration() -> Self {
        Self {
            name: "plugin-registration",
            repository: urls::PLUGIN_REGISTRATION_REPO,
            switch: "NAVAPP_PLUGIN_REGISTRATION",
        }
    }
}

impl Component for PluginComponent {
    fn name(&self) -> &str {
        self.name
    }

    fn repository(&self) -> Option<&str> {
        Some(self.repository)
    }

    fn is_external(&self) -> bool {
        false
    }

    fn umbrella(&self) -> Option<&'static str> {
        Some(defaults::APP_COMPONENT)
    }

    fn checkout(&self, ctx: &RunContext) -> Result<(), ComponentError> {
        vcs_checkout(self, self.repository, ctx)
    }

    fn update(&self, ctx: &RunContext) -> Result<(), ComponentError> {
        vcs_update(self, ctx)
    }

    fn contribute_to_umbrella(&self, cmake: &mut CMakeCommand, ctl: &ControlData) {
        cmake.set_define(self.switch, "ON");
        cmake.append_list_entry(
            "NAVAPP_EXTERNAL_PLUGINS",
            self.source_dir(ctl).display().to_string(),
        );
    }
}

/// The umbrella application. Its source tree hosts the orchestrator, so
/// there is nothing to check out; configure wires in every library's
/// config path and every registered plugin's contribution.
pub struct AppComponent {
    dep_names: Vec<&'static str>,
}

impl AppComponent {
    pub fn new() -> Self {
        Self {
            dep_names: APP_LINKS.iter().map(|l| l.component).collect(),
        }
    }
}

impl Default for AppComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for AppComponent {
    fn name(&self) -> &str {
        defaults::APP_COMPONENT
    }

    fn dependencies(&self) -> &[&'static str] {
        &self.dep_names
    }

    fn is_external(&self) -> bool {
        false
    }

    fn configure(&self, ctx: &RunContext) -> Result<(), ComponentError> {
        let mut cmake = base_cmake(self, ctx);
        cmake.set_define("NAVAPP_BUILD_TESTING", "ON");
        link_siblings(&mut cmake, self.name(), APP_LINKS, ctx)?;
        for plugin in ctx.siblings.plugins_for(self.name()) {
            plugin.contribute_to_umbrella(&mut cmake, ctx.control);
        }
        run_configure(&cmake, ctx)
    }

    fn build(&self, ctx: &RunContext) -> Result<(), ComponentError> {
        native_build(self, ctx)
    }

    fn make_clean(&self, ctx: &RunContext) -> Result<(), ComponentError> {
        native_clean(self, ctx)
    }

    fn reset(&self, ctx: &RunContext) -> Result<(), ComponentError> {
        reset_tree(self, ctx)
    }
}

/// Assemble the full platform stack in its canonical registration order
pub fn platform_assembly() -> LibraryAssembly {
    let mut assembly = LibraryAssembly::new();
    assembly.register(Box::new(CMakeComponent::eigen()));
    assembly.register(Box::new(CMakeComponent::vtk()));
    assembly.register(Box::new(CMakeComponent::itk()));
    assembly.register(Box::new(CMakeComponent::opencv()));
    assembly.register(Box::new(CMakeComponent::openigtlink()));
    assembly.register(Box::new(CMakeComponent::ctk()));
    assembly.register(Box::new(CMakeComponent::fast()));
    assembly.register(Box::new(PluginComponent::us_reconstruction()));
    assembly.register(Box::new(PluginComponent::registration()));
    assembly.register(Box::new(AppComponent::new()));
    assembly
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assembly::PhasePlan;
    use crate::core::control::{BuildType, ControlOptions};
    use crate::test_utils::RecordingRunner;
    use tempfile::TempDir;

    fn control_at(root: &std::path::Path, build_type: &str) -> ControlData {
        ControlData::from_options(ControlOptions {
            root_dir: Some(root.to_path_buf()),
            build_type: build_type.to_string(),
            ..ControlOptions::default()
        })
        .unwrap()
    }

    #[test]
    fn test_registration_order_is_fixed() {
        let assembly = platform_assembly();
        assert_eq!(
            assembly.names(),
            vec![
                "eigen",
                "vtk",
                "itk",
                "opencv",
                "openigtlink",
                "ctk",
                "fast",
                "plugin-us-reconstruction",
                "plugin-registration",
                "navapp",
            ]
        );
    }

    #[test]
    fn test_registration_order_is_already_topological() {
        let assembly = platform_assembly();
        let order = assembly.configure_order().unwrap();
        let names: Vec<String> = assembly.names().iter().map(ToString::to_string).collect();
        assert_eq!(order, names);
    }

    #[test]
    fn test_externals_build_release_when_app_is_debug() {
        let temp = TempDir::new().unwrap();
        let ctl = control_at(temp.path(), "Debug");
        let assembly = platform_assembly();
        let vtk = assembly.get("vtk").unwrap();
        let app = assembly.get("navapp").unwrap();
        assert_eq!(vtk.build_type(&ctl), BuildType::Release);
        assert_eq!(app.build_type(&ctl), BuildType::Debug);
        assert!(vtk.build_dir(&ctl).ends_with("build_Release"));
        assert!(app.build_dir(&ctl).ends_with("build_Debug"));
    }

    #[test]
    fn test_itk_configure_links_vtk_config_path() {
        let temp = TempDir::new().unwrap();
        let ctl = control_at(temp.path(), "Release");
        let mut assembly = platform_assembly();
        assembly.select_libraries(&["itk".to_string()]);

        let runner = RecordingRunner::new();
        let plan = PhasePlan {
            configure: true,
            ..PhasePlan::default()
        };
        assembly.process(&ctl, &runner, &plan).unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        let cmake = &calls[0];
        assert_eq!(cmake.program, "cmake");
        let vtk_dir = format!(
            "-DVTK_DIR={}",
            temp.path().join("vtk/build_Release").display()
        );
        assert!(
            cmake.args.contains(&vtk_dir),
            "expected {vtk_dir} in {:?}",
            cmake.args
        );
        assert!(cmake.args.contains(&"-DModule_ITKVtkGlue=ON".to_string()));
    }

    #[test]
    fn test_app_configure_collects_plugin_contributions() {
        let temp = TempDir::new().unwrap();
        let ctl = control_at(temp.path(), "Release");
        let mut assembly = platform_assembly();
        assembly.select_libraries(&["navapp".to_string()]);

        let runner = RecordingRunner::new();
        let plan = PhasePlan {
            configure: true,
            ..PhasePlan::default()
        };
        assembly.process(&ctl, &runner, &plan).unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        let args = &calls[0].args;
        assert!(args.contains(&"-DNAVAPP_PLUGIN_US_RECONSTRUCTION=ON".to_string()));
        assert!(args.contains(&"-DNAVAPP_PLUGIN_REGISTRATION=ON".to_string()));
        let plugins_list = args
            .iter()
            .find(|a| a.starts_with("-DNAVAPP_EXTERNAL_PLUGINS="))
            .expect("plugin source list define");
        assert!(plugins_list.contains("plugin-us-reconstruction"));
        assert!(plugins_list.contains(';'), "two plugins joined as a list");
    }

    #[test]
    fn test_static_link_disables_shared_libs() {
        let temp = TempDir::new().unwrap();
        let mut ctl = control_at(temp.path(), "Release");
        ctl.static_link = true;
        let mut assembly = platform_assembly();
        assembly.select_libraries(&["eigen".to_string()]);

        let runner = RecordingRunner::new();
        let plan = PhasePlan {
            configure: true,
            ..PhasePlan::default()
        };
        assembly.process(&ctl, &runner, &plan).unwrap();
        assert!(runner.calls()[0]
            .args
            .contains(&"-DBUILD_SHARED_LIBS=OFF".to_string()));
    }

    #[test]
    fn test_plugins_have_no_standalone_configure_or_build() {
        let temp = TempDir::new().unwrap();
        let ctl = control_at(temp.path(), "Release");
        let mut assembly = platform_assembly();
        assembly.select_libraries(&["plugin-us-reconstruction".to_string()]);

        let runner = RecordingRunner::new();
        let plan = PhasePlan {
            configure: true,
            build: true,
            ..PhasePlan::default()
        };
        assembly.process(&ctl, &runner, &plan).unwrap();
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_app_checkout_is_a_noop() {
        let temp = TempDir::new().unwrap();
        let ctl = control_at(temp.path(), "Release");
        let mut assembly = platform_assembly();
        assembly.select_libraries(&["navapp".to_string()]);

        let runner = RecordingRunner::new();
        let plan = PhasePlan {
            checkout: true,
            ..PhasePlan::default()
        };
        assembly.process(&ctl, &runner, &plan).unwrap();
        assert!(runner.calls().is_empty());
    }
}

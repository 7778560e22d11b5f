//! Component capability model
//!
//! Every orchestrated library or module implements [`Component`]: a name,
//! an optional source repository, declared dependencies, and the six
//! lifecycle operations. Operations default to no-ops so a component only
//! overrides what applies to it; dispatch goes through the typed
//! [`Operation`] enum, never through reflection.

use std::fmt;
use std::path::PathBuf;

use crate::config::defaults;
use crate::core::builder::CMakeCommand;
use crate::core::control::{BuildType, ControlData};
use crate::error::ComponentError;
use crate::infra::git::GitRef;
use crate::infra::process::CommandRunner;

/// One lifecycle operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Checkout,
    Update,
    Reset,
    Configure,
    MakeClean,
    Build,
}

impl Operation {
    /// The fixed global precedence of phases within one `process` run
    pub const SEQUENCE: [Self; 6] = [
        Self::Checkout,
        Self::Update,
        Self::Reset,
        Self::Configure,
        Self::MakeClean,
        Self::Build,
    ];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Checkout => "checkout",
            Self::Update => "update",
            Self::Reset => "reset",
            Self::Configure => "configure",
            Self::MakeClean => "make-clean",
            Self::Build => "build",
        };
        f.write_str(name)
    }
}

/// Read-only view of the other components registered in the same assembly.
///
/// Configure steps use this to read a dependency's computed config path
/// and to collect plugin contributions; it is a lookup, not a mutation
/// channel.
pub struct Siblings<'a> {
    components: &'a [Box<dyn Component>],
}

impl<'a> Siblings<'a> {
    /// Wrap the assembly's component list
    pub fn new(components: &'a [Box<dyn Component>]) -> Self {
        Self { components }
    }

    /// Look up a registered component by name
    pub fn get(&self, name: &str) -> Option<&dyn Component> {
        self.components
            .iter()
            .find(|c| c.name() == name)
            .map(AsRef::as_ref)
    }

    /// A sibling's computed configuration path, if it is registered
    pub fn config_path(&self, name: &str, ctl: &ControlData) -> Option<PathBuf> {
        self.get(name).map(|c| c.config_path(ctl))
    }

    /// All components registered as plugins of the given umbrella
    /// component, in registration order
    pub fn plugins_for(&self, umbrella: &str) -> Vec<&dyn Component> {
        self.components
            .iter()
            .filter(|c| c.umbrella() == Some(umbrella))
            .map(AsRef::as_ref)
            .collect()
    }
}

/// Everything a lifecycle operation may touch: the immutable run
/// configuration, the command runner, and the sibling view
pub struct RunContext<'a> {
    pub control: &'a ControlData,
    pub runner: &'a dyn CommandRunner,
    pub siblings: Siblings<'a>,
}

/// One unit of checkout/configure/build logic.
///
/// All operations default to doing nothing, so a component that has no
/// notion of, say, `make_clean` simply leaves it unimplemented.
pub trait Component {
    /// Unique name within an assembly
    fn name(&self) -> &str;

    /// Source repository; `None` means the component is not checked out
    /// externally (its source hosts the orchestrator itself)
    fn repository(&self) -> Option<&str> {
        None
    }

    /// Exact revision this component is pinned to, if any
    fn pinned_ref(&self) -> Option<&GitRef> {
        None
    }

    /// Names of components whose configuration must precede this one's
    fn dependencies(&self) -> &[&'static str] {
        &[]
    }

    /// External libraries build with the externals build type (Release by
    /// default); the application and its plugins follow the requested type
    fn is_external(&self) -> bool {
        true
    }

    /// The umbrella component this one plugs into, if it is a plugin
    fn umbrella(&self) -> Option<&'static str> {
        None
    }

    /// Effective build type for this component
    fn build_type(&self, ctl: &ControlData) -> BuildType {
        ctl.build_type_for(self.is_external())
    }

    /// Source checkout location: `<root>/<name>/src`
    fn source_dir(&self, ctl: &ControlData) -> PathBuf {
        ctl.component_dir(self.name()).join(defaults::SOURCE_DIRNAME)
    }

    /// Build tree location: `<root>/<name>/<derived build folder>`
    fn build_dir(&self, ctl: &ControlData) -> PathBuf {
        ctl.component_dir(self.name())
            .join(ctl.build_folder(self.name(), self.build_type(ctl)))
    }

    /// Where siblings find this component's cmake package configuration
    fn config_path(&self, ctl: &ControlData) -> PathBuf {
        self.build_dir(ctl)
    }

    /// Revision to check out: per-component pin, then the run's tag, then
    /// the main branch
    fn target_ref(&self, ctl: &ControlData) -> GitRef {
        if let Some(pinned) = self.pinned_ref() {
            return pinned.clone();
        }
        if let Some(tag) = &ctl.git_tag {
            return GitRef::Tag(tag.clone());
        }
        GitRef::Branch(ctl.main_branch.clone())
    }

    /// Clone the source if no checkout exists yet
    fn checkout(&self, _ctx: &RunContext) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Bring an existing checkout to the target revision
    fn update(&self, _ctx: &RunContext) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Run the build-system generator
    fn configure(&self, _ctx: &RunContext) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Run the native build tool
    fn build(&self, _ctx: &RunContext) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Delete the build tree
    fn reset(&self, _ctx: &RunContext) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Run the native tool's clean target
    fn make_clean(&self, _ctx: &RunContext) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Inject this plugin's options into the umbrella component's
    /// configure invocation (reverse dependency injection)
    fn contribute_to_umbrella(&self, _cmake: &mut CMakeCommand, _ctl: &ControlData) {}

    /// Typed dispatch of one lifecycle operation
    fn run(&self, operation: Operation, ctx: &RunContext) -> Result<(), ComponentError> {
        match operation {
            Operation::Checkout => self.checkout(ctx),
            Operation::Update => self.update(ctx),
            Operation::Reset => self.reset(ctx),
            Operation::Configure => self.configure(ctx),
            Operation::MakeClean => self.make_clean(ctx),
            Operation::Build => self.build(ctx),
        }
    }
}

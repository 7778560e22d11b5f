//! Component assembly and lifecycle sequencing
//!
//! [`LibraryAssembly`] is the ordered registry of every component taking
//! part in one run. Processing is phase-major: each requested phase runs
//! across the whole selected subset before the next phase begins. The
//! configure phase alone follows the topological order of declared
//! dependencies (stable with respect to registration order), so a
//! component's configure can rely on its dependencies' configure having
//! completed; a dependency cycle fails the run before any external
//! command is issued.

use std::collections::HashSet;

use crate::core::component::{Component, Operation, RunContext, Siblings};
use crate::core::control::ControlData;
use crate::error::AssemblyError;
use crate::infra::process::CommandRunner;

/// Which lifecycle phases one `process` run executes.
///
/// Requesting `checkout` also schedules an `update` phase so fresh clones
/// land on the target revision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhasePlan {
    pub checkout: bool,
    pub configure_clean: bool,
    pub configure: bool,
    pub clean: bool,
    pub build: bool,
}

impl PhasePlan {
    /// The standard full pipeline: checkout, configure, build
    pub fn full() -> Self {
        Self {
            checkout: true,
            configure: true,
            build: true,
            ..Self::default()
        }
    }

    /// Expand the flags into the fixed phase precedence
    pub fn phases(&self) -> Vec<Operation> {
        let mut phases = Vec::new();
        if self.checkout {
            phases.push(Operation::Checkout);
            phases.push(Operation::Update);
        }
        if self.configure_clean {
            phases.push(Operation::Reset);
        }
        if self.configure {
            phases.push(Operation::Configure);
        }
        if self.clean {
            phases.push(Operation::MakeClean);
        }
        if self.build {
            phases.push(Operation::Build);
        }
        phases
    }
}

/// Ordered registry of components plus the currently selected subset
#[derive(Default)]
pub struct LibraryAssembly {
    components: Vec<Box<dyn Component>>,
    selection: Vec<String>,
}

impl LibraryAssembly {
    /// Create an empty assembly
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component. Registration order is the build order within
    /// a phase. New components start out selected.
    pub fn register(&mut self, component: Box<dyn Component>) {
        debug_assert!(
            self.get(component.name()).is_none(),
            "component '{}' registered twice",
            component.name()
        );
        self.selection.push(component.name().to_string());
        self.components.push(component);
    }

    /// All registered component names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name()).collect()
    }

    /// Look up a component by name
    pub fn get(&self, name: &str) -> Option<&dyn Component> {
        self.components
            .iter()
            .find(|c| c.name() == name)
            .map(AsRef::as_ref)
    }

    /// Restrict the selection to the given names.
    ///
    /// The resulting selection is the intersection of the request and the
    /// registry, in registration order. Requested names that are not
    /// registered are dropped without error.
    pub fn select_libraries(&mut self, requested: &[String]) {
        for name in requested {
            if self.get(name).is_none() {
                tracing::warn!("unknown component '{name}' ignored");
            }
        }
        self.selection = self
            .components
            .iter()
            .map(|c| c.name().to_string())
            .filter(|name| requested.contains(name))
            .collect();
    }

    /// Select every registered component
    pub fn select_all(&mut self) {
        self.selection = self.components.iter().map(|c| c.name().to_string()).collect();
    }

    /// The current selection, in registration order
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Topological order of the selection for the configure phase.
    ///
    /// Stable: among components whose dependencies are satisfied, earlier
    /// registration wins, so an assembly registered in dependency order
    /// configures in exactly its registration order. Dependencies outside
    /// the selection do not constrain it.
    pub fn configure_order(&self) -> Result<Vec<String>, AssemblyError> {
        let selected: Vec<&str> = self.selection.iter().map(String::as_str).collect();
        let mut done: HashSet<&str> = HashSet::new();
        let mut remaining = selected.clone();
        let mut order = Vec::new();

        while !remaining.is_empty() {
            let mut progressed = false;
            let mut i = 0;
            while i < remaining.len() {
                let name = remaining[i];
                let component = self
                    .get(name)
                    .expect("selection is always a subset of the registry");
                let ready = component
                    .dependencies()
                    .iter()
                    .all(|dep| !selected.contains(dep) || done.contains(dep));
                if ready {
                    done.insert(name);
                    order.push(name.to_string());
                    remaining.remove(i);
                    progressed = true;
                } else {
                    i += 1;
                }
            }
            if !progressed {
                return Err(AssemblyError::CircularDependency {
                    cycle: remaining.iter().map(ToString::to_string).collect(),
                });
            }
        }
        Ok(order)
    }

    /// Execute the requested phases over the selected subset.
    ///
    /// Phase-major: every selected component finishes phase N before any
    /// component starts phase N+1. The first failing operation aborts the
    /// whole run.
    pub fn process(
        &self,
        control: &ControlData,
        runner: &dyn CommandRunner,
        plan: &PhasePlan,
    ) -> Result<(), AssemblyError> {
        let phases = plan.phases();
        let configure_order = if phases.contains(&Operation::Configure) {
            Some(self.configure_order()?)
        } else {
            None
        };

        for operation in phases {
            let order = match operation {
                Operation::Configure => configure_order
                    .clone()
                    .expect("configure order computed above"),
                _ => self.selection.clone(),
            };
            for name in &order {
                let component = self
                    .get(name)
                    .expect("selection is always a subset of the registry");
                tracing::debug!(component = %name, operation = %operation, "phase step");
                let ctx = RunContext {
                    control,
                    runner,
                    siblings: Siblings::new(&self.components),
                };
                component
                    .run(operation, &ctx)
                    .map_err(|source| AssemblyError::Operation {
                        component: name.clone(),
                        operation,
                        source,
                    })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::control::ControlOptions;
    use crate::error::ComponentError;
    use crate::test_utils::RecordingRunner;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    type OpLog = Arc<Mutex<Vec<(Operation, String)>>>;

    struct Stub {
        name: &'static str,
        deps: Vec<&'static str>,
        log: OpLog,
        fail_on: Option<Operation>,
    }

    impl Stub {
        fn boxed(name: &'static str, deps: Vec<&'static str>, log: &OpLog) -> Box<dyn Component> {
            Box::new(Self {
                name,
                deps,
                log: Arc::clone(log),
                fail_on: None,
            })
        }

        fn record(&self, operation: Operation) -> Result<(), ComponentError> {
            if self.fail_on == Some(operation) {
                return Err(ComponentError::MissingSibling {
                    component: self.name.to_string(),
                    dependency: "injected failure".to_string(),
                });
            }
            self.log
                .lock()
                .unwrap()
                .push((operation, self.name.to_string()));
            Ok(())
        }
    }

    impl Component for Stub {
        fn name(&self) -> &str {
            self.name
        }
        fn dependencies(&self) -> &[&'static str] {
            &self.deps
        }
        fn checkout(&self, _ctx: &RunContext) -> Result<(), ComponentError> {
            self.record(Operation::Checkout)
        }
        fn update(&self, _ctx: &RunContext) -> Result<(), ComponentError> {
            self.record(Operation::Update)
        }
        fn configure(&self, _ctx: &RunContext) -> Result<(), ComponentError> {
            self.record(Operation::Configure)
        }
        fn build(&self, _ctx: &RunContext) -> Result<(), ComponentError> {
            self.record(Operation::Build)
        }
        fn reset(&self, _ctx: &RunContext) -> Result<(), ComponentError> {
            self.record(Operation::Reset)
        }
        fn make_clean(&self, _ctx: &RunContext) -> Result<(), ComponentError> {
            self.record(Operation::MakeClean)
        }
    }

    fn control() -> ControlData {
        ControlData::from_options(ControlOptions {
            root_dir: Some(PathBuf::from("/work/dev")),
            ..ControlOptions::default()
        })
        .unwrap()
    }

    fn abc_assembly(log: &OpLog) -> LibraryAssembly {
        let mut assembly = LibraryAssembly::new();
        assembly.register(Stub::boxed("A", vec![], log));
        assembly.register(Stub::boxed("B", vec![], log));
        assembly.register(Stub::boxed("C", vec![], log));
        assembly
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    // ============================================
    // Unit Tests - PhasePlan
    // ============================================

    #[test]
    fn test_checkout_implies_update_phase() {
        let plan = PhasePlan {
            checkout: true,
            ..PhasePlan::default()
        };
        assert_eq!(plan.phases(), vec![Operation::Checkout, Operation::Update]);
    }

    #[test]
    fn test_phases_follow_fixed_precedence() {
        let plan = PhasePlan {
            checkout: true,
            configure_clean: true,
            configure: true,
            clean: true,
            build: true,
        };
        assert_eq!(
            plan.phases(),
            vec![
                Operation::Checkout,
                Operation::Update,
                Operation::Reset,
                Operation::Configure,
                Operation::MakeClean,
                Operation::Build,
            ]
        );
    }

    // ============================================
    // Unit Tests - selection
    // ============================================

    #[test]
    fn test_selection_defaults_to_all() {
        let log = OpLog::default();
        let assembly = abc_assembly(&log);
        assert_eq!(assembly.selection(), strings(&["A", "B", "C"]));
    }

    #[test]
    fn test_select_unknown_names_are_silently_dropped() {
        let log = OpLog::default();
        let mut assembly = abc_assembly(&log);
        assembly.select_libraries(&strings(&["B", "X"]));
        assert_eq!(assembly.selection(), strings(&["B"]));
    }

    #[test]
    fn test_selection_preserves_registration_order() {
        let log = OpLog::default();
        let mut assembly = abc_assembly(&log);
        assembly.select_libraries(&strings(&["C", "A"]));
        assert_eq!(assembly.selection(), strings(&["A", "C"]));
    }

    #[test]
    fn test_select_all_restores_everything() {
        let log = OpLog::default();
        let mut assembly = abc_assembly(&log);
        assembly.select_libraries(&strings(&["B"]));
        assembly.select_all();
        assert_eq!(assembly.selection(), strings(&["A", "B", "C"]));
    }

    // ============================================
    // Unit Tests - phase-major processing
    // ============================================

    #[test]
    fn test_full_pipeline_is_phase_major_in_registration_order() {
        let log = OpLog::default();
        let assembly = abc_assembly(&log);
        let runner = RecordingRunner::new();
        assembly
            .process(&control(), &runner, &PhasePlan::full())
            .unwrap();

        let expected: Vec<(Operation, String)> = [
            (Operation::Checkout, "A"),
            (Operation::Checkout, "B"),
            (Operation::Checkout, "C"),
            (Operation::Update, "A"),
            (Operation::Update, "B"),
            (Operation::Update, "C"),
            (Operation::Configure, "A"),
            (Operation::Configure, "B"),
            (Operation::Configure, "C"),
            (Operation::Build, "A"),
            (Operation::Build, "B"),
            (Operation::Build, "C"),
        ]
        .into_iter()
        .map(|(op, name)| (op, name.to_string()))
        .collect();
        assert_eq!(*log.lock().unwrap(), expected);
    }

    #[test]
    fn test_only_requested_phases_run() {
        let log = OpLog::default();
        let assembly = abc_assembly(&log);
        let runner = RecordingRunner::new();
        let plan = PhasePlan {
            build: true,
            ..PhasePlan::default()
        };
        assembly.process(&control(), &runner, &plan).unwrap();
        let entries = log.lock().unwrap();
        assert!(entries.iter().all(|(op, _)| *op == Operation::Build));
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_failure_aborts_mid_phase() {
        let log = OpLog::default();
        let mut assembly = LibraryAssembly::new();
        assembly.register(Stub::boxed("A", vec![], &log));
        assembly.register(Box::new(Stub {
            name: "B",
            deps: vec![],
            log: Arc::clone(&log),
            fail_on: Some(Operation::Build),
        }));
        assembly.register(Stub::boxed("C", vec![], &log));

        let runner = RecordingRunner::new();
        let plan = PhasePlan {
            build: true,
            ..PhasePlan::default()
        };
        let err = assembly.process(&control(), &runner, &plan).unwrap_err();
        match err {
            AssemblyError::Operation {
                component,
                operation,
                ..
            } => {
                assert_eq!(component, "B");
                assert_eq!(operation, Operation::Build);
            }
            e => panic!("Expected Operation error, got: {e:?}"),
        }
        // A built, C never ran
        assert_eq!(
            *log.lock().unwrap(),
            vec![(Operation::Build, "A".to_string())]
        );
    }

    // ============================================
    // Unit Tests - configure ordering
    // ============================================

    #[test]
    fn test_configure_respects_declared_dependencies() {
        let log = OpLog::default();
        let mut assembly = LibraryAssembly::new();
        // Registered out of dependency order on purpose
        assembly.register(Stub::boxed("app", vec!["itk", "vtk"], &log));
        assembly.register(Stub::boxed("vtk", vec![], &log));
        assembly.register(Stub::boxed("itk", vec!["vtk"], &log));

        assert_eq!(
            assembly.configure_order().unwrap(),
            strings(&["vtk", "itk", "app"])
        );

        let runner = RecordingRunner::new();
        let plan = PhasePlan {
            configure: true,
            build: true,
            ..PhasePlan::default()
        };
        assembly.process(&control(), &runner, &plan).unwrap();

        let entries = log.lock().unwrap().clone();
        // Configure reordered; build stays in registration order
        assert_eq!(
            entries,
            vec![
                (Operation::Configure, "vtk".to_string()),
                (Operation::Configure, "itk".to_string()),
                (Operation::Configure, "app".to_string()),
                (Operation::Build, "app".to_string()),
                (Operation::Build, "vtk".to_string()),
                (Operation::Build, "itk".to_string()),
            ]
        );
    }

    #[test]
    fn test_dependencies_outside_selection_do_not_constrain() {
        let log = OpLog::default();
        let mut assembly = LibraryAssembly::new();
        assembly.register(Stub::boxed("vtk", vec![], &log));
        assembly.register(Stub::boxed("itk", vec!["vtk"], &log));
        assembly.select_libraries(&strings(&["itk"]));
        assert_eq!(assembly.configure_order().unwrap(), strings(&["itk"]));
    }

    #[test]
    fn test_dependency_cycle_is_detected_before_any_operation() {
        let log = OpLog::default();
        let mut assembly = LibraryAssembly::new();
        assembly.register(Stub::boxed("x", vec!["y"], &log));
        assembly.register(Stub::boxed("y", vec!["x"], &log));

        let runner = RecordingRunner::new();
        let plan = PhasePlan {
            checkout: true,
            configure: true,
            build: true,
            ..PhasePlan::default()
        };
        let err = assembly.process(&control(), &runner, &plan).unwrap_err();
        match err {
            AssemblyError::CircularDependency { cycle } => {
                assert_eq!(cycle, strings(&["x", "y"]));
            }
            e => panic!("Expected CircularDependency, got: {e:?}"),
        }
        assert!(
            log.lock().unwrap().is_empty(),
            "no operation may run when the dependency graph is cyclic"
        );
    }
}

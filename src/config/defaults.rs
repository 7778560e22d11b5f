//! Default configuration values

/// Name of the umbrella application component
pub const APP_COMPONENT: &str = "navapp";

/// Default branch checked out when no tag is requested
pub const DEFAULT_MAIN_BRANCH: &str = "master";

/// Branch tried when the main branch does not exist on a remote
pub const FALLBACK_BRANCH: &str = "develop";

/// Directory under $HOME used as the root when --root-dir is not given
pub const DEFAULT_ROOT_DIRNAME: &str = "dev";

/// Directory name for source checkouts inside a component directory
pub const SOURCE_DIRNAME: &str = "src";

/// Directory under the root where test reports are written
pub const TEST_REPORT_DIR: &str = "test-reports";

/// Directory under the root where the install step unpacks the package
pub const INSTALL_DIRNAME: &str = "install";

/// Directory under the root where published artifacts are staged
pub const RELEASE_DIRNAME: &str = "releases";

/// Minimum supported cmake version
pub const MIN_CMAKE_VERSION: &str = "3.5.0";

/// Seconds the installed application must stay alive to pass the smoke test
pub const SMOKE_TEST_TIMEOUT_SECS: u64 = 5;

/// Default tag filter passed to the application's unit-test runner
pub const DEFAULT_TEST_TAGS: &str = "[unit]";

/// File name of the application's unit-test runner inside the build tree
pub const TEST_RUNNER_NAME: &str = "navapp-tests";

/// File name of the installed application binary
pub const APP_BINARY: &str = "navapp";

//! Doctor command logic
//!
//! Checks that the external tools the orchestrator drives are present and
//! recent enough, and reports issues with suggestions.

use serde::Serialize;

use crate::config::defaults;
use crate::core::builder::Generator;
use crate::core::control::ControlData;

/// Result of a single tool check
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Name of the tool being checked
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Version if available
    pub version: Option<String>,
    /// Error message if the check failed
    pub error: Option<String>,
    /// Suggestion for fixing the issue
    pub suggestion: Option<String>,
    /// Whether this tool is required for the current configuration
    pub required: bool,
}

impl CheckResult {
    /// Create a passing check result
    pub fn pass(name: &str, version: Option<String>, required: bool) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            version,
            error: None,
            suggestion: None,
            required,
        }
    }

    /// Create a failing check result
    pub fn fail(name: &str, error: &str, suggestion: Option<&str>, required: bool) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            version: None,
            error: Some(error.to_string()),
            suggestion: suggestion.map(String::from),
            required,
        }
    }
}

/// Overall doctor report
#[derive(Debug, Default, Serialize)]
pub struct DoctorReport {
    /// Individual check results
    pub checks: Vec<CheckResult>,
}

impl DoctorReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a check result
    pub fn add(&mut self, result: CheckResult) {
        self.checks.push(result);
    }

    /// Whether every required check passed
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
    }

    /// Count passed checks
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Count failed checks
    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }
}

/// Query a tool's `--version` output and extract a version number
fn tool_version(tool: &str) -> Option<String> {
    let output = std::process::Command::new(tool)
        .arg("--version")
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let combined = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    extract_version(&combined)
}

/// Extract a version number like "3.22.1" or "v2.39" from tool output
fn extract_version(output: &str) -> Option<String> {
    let version_regex = regex::Regex::new(r"v?(\d+\.\d+(?:\.\d+)?)").ok()?;
    version_regex
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse a possibly two-part version ("3.22") as semver
fn parse_loose_semver(version: &str) -> Option<semver::Version> {
    let padded = match version.matches('.').count() {
        1 => format!("{version}.0"),
        _ => version.to_string(),
    };
    semver::Version::parse(&padded).ok()
}

/// Generic presence + version check for one tool
pub fn check_tool(tool: &str, required: bool, install_hint: &str) -> CheckResult {
    if which::which(tool).is_err() {
        return CheckResult::fail(
            tool,
            &format!("'{tool}' not found in PATH"),
            Some(install_hint),
            required,
        );
    }
    CheckResult::pass(tool, tool_version(tool), required)
}

/// cmake presence check with a minimum version floor
pub fn check_cmake() -> CheckResult {
    let result = check_tool("cmake", true, "Install cmake from your package manager");
    if !result.passed {
        return result;
    }
    let Some(version) = result.version.as_deref() else {
        return result;
    };
    let minimum = parse_loose_semver(defaults::MIN_CMAKE_VERSION)
        .expect("minimum cmake version constant is valid semver");
    match parse_loose_semver(version) {
        Some(found) if found < minimum => CheckResult::fail(
            "cmake",
            &format!(
                "cmake {version} is older than the required {}",
                defaults::MIN_CMAKE_VERSION
            ),
            Some("Upgrade cmake"),
            true,
        ),
        _ => result,
    }
}

/// Run all checks for the active configuration
pub fn run_doctor(ctl: &ControlData) -> DoctorReport {
    let mut report = DoctorReport::new();
    report.add(check_tool("git", true, "Install git from your package manager"));
    report.add(check_cmake());

    let native = Generator::select(ctl).build_tool();
    report.add(check_tool(
        native,
        true,
        "Install the native build tool for the selected generator",
    ));

    report.add(check_tool("ctest", false, "ctest ships with cmake"));
    report.add(check_tool("cpack", false, "cpack ships with cmake"));
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_constructors() {
        let pass = CheckResult::pass("git", Some("2.39.0".to_string()), true);
        assert!(pass.passed);
        assert_eq!(pass.version.as_deref(), Some("2.39.0"));

        let fail = CheckResult::fail("jom", "not found", Some("install jom"), false);
        assert!(!fail.passed);
        assert_eq!(fail.error.as_deref(), Some("not found"));
        assert_eq!(fail.suggestion.as_deref(), Some("install jom"));
    }

    #[test]
    fn test_report_counts() {
        let mut report = DoctorReport::new();
        report.add(CheckResult::pass("a", None, true));
        report.add(CheckResult::fail("b", "err", None, true));
        report.add(CheckResult::pass("c", None, false));

        assert_eq!(report.passed_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.all_required_passed());
    }

    #[test]
    fn test_optional_failures_do_not_block() {
        let mut report = DoctorReport::new();
        report.add(CheckResult::pass("git", None, true));
        report.add(CheckResult::fail("cpack", "err", None, false));
        assert!(report.all_required_passed());
    }

    #[test]
    fn test_extract_version() {
        assert_eq!(
            extract_version("cmake version 3.22.1"),
            Some("3.22.1".to_string())
        );
        assert_eq!(
            extract_version("git version 2.39.0"),
            Some("2.39.0".to_string())
        );
        assert_eq!(extract_version("v1.11"), Some("1.11".to_string()));
        assert_eq!(extract_version("no digits here"), None);
    }

    #[test]
    fn test_parse_loose_semver_pads_two_part_versions() {
        assert_eq!(
            parse_loose_semver("3.22"),
            Some(semver::Version::new(3, 22, 0))
        );
        assert_eq!(
            parse_loose_semver("3.22.1"),
            Some(semver::Version::new(3, 22, 1))
        );
        assert_eq!(parse_loose_semver("not-a-version"), None);
    }
}

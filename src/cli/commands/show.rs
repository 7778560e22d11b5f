//! CLI implementation for `stackforge show`
//!
//! Lists the component registry and the resolved configure order.

use anyhow::Result;
use serde::Serialize;

use crate::core::catalog::platform_assembly;
use crate::core::control::ControlData;

/// One registry row for display or JSON output
#[derive(Debug, Serialize)]
struct ComponentInfo {
    name: String,
    repository: Option<String>,
    dependencies: Vec<String>,
    external: bool,
    build_folder: String,
}

#[derive(Debug, Serialize)]
struct ShowReport {
    components: Vec<ComponentInfo>,
    configure_order: Vec<String>,
}

/// Execute the show command
pub async fn execute(control: &ControlData, json: bool) -> Result<()> {
    let assembly = platform_assembly();
    let configure_order = assembly.configure_order()?;

    let components: Vec<ComponentInfo> = assembly
        .names()
        .iter()
        .map(|name| {
            let c = assembly.get(name).expect("registered name");
            ComponentInfo {
                name: c.name().to_string(),
                repository: c.repository().map(ToString::to_string),
                dependencies: c.dependencies().iter().map(ToString::to_string).collect(),
                external: c.is_external(),
                build_folder: control.build_folder(c.name(), c.build_type(control)),
            }
        })
        .collect();

    if json {
        let report = ShowReport {
            components,
            configure_order,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for info in &components {
        let kind = if info.external { "external" } else { "platform" };
        let repo = info.repository.as_deref().unwrap_or("(local source)");
        println!("{:<26} {kind:<9} {repo}", info.name);
        if !info.dependencies.is_empty() {
            println!("{:<26} depends on {}", "", info.dependencies.join(", "));
        }
    }
    println!("\nconfigure order: {}", configure_order.join(" -> "));
    Ok(())
}

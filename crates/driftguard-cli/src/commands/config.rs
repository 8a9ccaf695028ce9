//! Config command

use std::path::Path;

use driftguard_core::MonitorConfig;

use crate::output::{self, OutputFormat};

pub fn execute(
    config: &MonitorConfig,
    source: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => output::print_json(config),
        OutputFormat::Text => {
            let origin = match source {
                Some(path) => path.display().to_string(),
                None => "built-in defaults".to_string(),
            };
            output::print_success(&format!("configuration is valid ({origin})"));
            println!();
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

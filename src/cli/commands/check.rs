//! Environment check command.

use console::style;

use agendex::config::Settings;
use agendex::extract::{PopplerBackend, TextExtractor};

/// Report Poppler tool availability and the resolved model settings.
pub fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    println!("\n{}", style("Extraction Tools").bold());
    println!("{}", "-".repeat(50));

    let tools = TextExtractor::<PopplerBackend>::check_tools();
    let mut all_found = true;
    for (tool, available) in &tools {
        let status = if *available {
            style("✓ found").green()
        } else {
            all_found = false;
            style("✗ not found").red()
        };
        println!("  {:<15} {}", tool, status);
    }
    if !all_found {
        println!(
            "  {}",
            style("Install poppler-utils (apt) or poppler (brew)").dim()
        );
    }

    let llm = &settings.llm;
    println!("\n{}", style("Model").bold());
    println!("{}", "-".repeat(50));
    println!("  {:<15} {}", "provider", llm.provider);
    println!("  {:<15} {}", "model", llm.model_id());
    println!("  {:<15} {}", "endpoint", llm.invoke_url());
    println!("  {:<15} {}", "max tokens", llm.max_tokens);
    let key_status = if llm.api_key.is_some() {
        style("✓ configured".to_string()).green()
    } else {
        style(format!("✗ missing (set {})", llm.provider.key_env_var())).red()
    };
    println!("  {:<15} {}", "api key", key_status);

    println!("\n  {:<15} {}", "input", settings.input.display());
    println!("  {:<15} {}", "output", settings.output.display());

    Ok(())
}

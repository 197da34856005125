// Commands module - handles CLI command execution

use anyhow::Result;
use std::path::Path;

pub mod count;
pub mod replay;
pub mod validate;

pub use count::handle_count;
pub use replay::handle_replay;
pub use validate::handle_validate;

use crate::config::{self, Config};

/// Handle shell completion
pub fn handle_completion(shell_type: &str) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{Shell, generate};

    let shell = match shell_type.to_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "powershell" => Shell::PowerShell,
        _ => {
            anyhow::bail!(
                "Unsupported shell: {}. Supported: bash, zsh, fish, powershell",
                shell_type
            );
        }
    };

    let mut cmd = crate::cli::Cli::command();
    let name = cmd.get_name().to_string();
    let mut stdout = std::io::stdout();

    generate(shell, &mut cmd, name, &mut stdout);

    Ok(())
}

/// Print the effective configuration
pub fn show_config(config: Option<&Config>) {
    println!("Current configuration:");

    match config {
        Some(cfg) => {
            println!("\n  Configuration file loaded:");
            println!("    Output dir: {}", cfg.report.output_dir);
            println!("    File prefix: {}", cfg.report.file_prefix);
            println!("    Title: {}", cfg.report.title);
            println!("    Formats: {}", cfg.report.formats.join(", "));
            println!("    Open after flush: {}", cfg.report.open_after_flush);
            println!("    Parallel: {}", cfg.run.parallel);
            for (key, value) in &cfg.system_info {
                println!("    System info {}: {}", key, value);
            }
            for key in cfg.properties.keys() {
                println!("    Property: {}", key);
            }
            if !cfg.secrets.is_empty() {
                println!("    Secrets: {} key(s) from {}", cfg.secrets.len(), config::SECRETS_FILE);
            }
        }
        None => {
            println!("\n  No configuration file loaded");
            println!("  Create one with: stepreport --init-config .stepreportrc.toml");
        }
    }

    println!("\n  Environment variables:");
    match std::env::var(config::ENV_STEPREPORT_OUTPUT_DIR) {
        Ok(dir) => println!("    {}: {}", config::ENV_STEPREPORT_OUTPUT_DIR, dir),
        Err(_) => println!(
            "    {}: not set (default: {})",
            config::ENV_STEPREPORT_OUTPUT_DIR,
            config::default_output_dir()
        ),
    }

    print_precedence();
}

/// Write a default configuration file
pub fn init_config(path: &Path) -> Result<()> {
    std::fs::write(path, Config::default().to_toml())?;
    println!("Configuration file created: {}", path.display());
    println!("\nYou can now edit the file to customize your settings.");
    print_precedence();
    Ok(())
}

fn print_precedence() {
    println!("\nConfiguration precedence:");
    println!("  1. Command-line arguments (highest)");
    println!("  2. Environment variables");
    println!("  3. Configuration file");
    println!("  4. Built-in defaults (lowest)");
}

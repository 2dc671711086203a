//! List command - show one directory.

use crate::app::App;
use crate::OutputFormat;
use sharelens_core::{scan, Config};
use std::path::Path;

/// Run the list command.
pub fn run(config: Config, path: &Path, output: OutputFormat) -> anyhow::Result<()> {
    let app = App::new(config)?;
    let mut listing = scan(app.scanner.as_ref(), path)?;

    match output {
        OutputFormat::Text => {
            listing.folders.sort_by(|a, b| a.name.cmp(&b.name));
            listing.files.sort_by(|a, b| a.name.cmp(&b.name));

            for folder in &listing.folders {
                println!("📁 {}", folder.name);
            }
            for file in &listing.files {
                println!(
                    "📄 {} ({} bytes, {})",
                    file.name,
                    file.size,
                    file.modified.format("%Y-%m-%d %H:%M:%S")
                );
            }

            eprintln!();
            eprintln!(
                "{} folders, {} files",
                listing.folders.len(),
                listing.files.len()
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
    }

    Ok(())
}

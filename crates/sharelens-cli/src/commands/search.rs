//! Search command - walk every shared root for matching files.

use crate::app::App;
use crate::OutputFormat;
use sharelens_core::{Config, MIN_QUERY_LEN};
use std::time::Instant;

/// Run the search command.
pub fn run(config: Config, query: &str, limit: usize, output: OutputFormat) -> anyhow::Result<()> {
    if query.chars().count() < MIN_QUERY_LEN {
        eprintln!("Query must be at least {} characters.", MIN_QUERY_LEN);
        return Ok(());
    }

    let app = App::new(config)?;

    if app.searcher.roots().is_empty() {
        eprintln!("No shared roots configured. Add [[roots]] to the configuration file.");
        return Ok(());
    }

    let start = Instant::now();
    let hits = app.searcher.search(query);
    let elapsed = start.elapsed();
    let shown = &hits[..hits.len().min(limit)];

    match output {
        OutputFormat::Text => {
            for hit in shown {
                let size = hit.size.map(|s| format!(" ({} bytes)", s)).unwrap_or_default();
                if hit.tags.is_empty() {
                    println!("📄 {}{}", hit.path, size);
                } else {
                    println!("📄 {}{} [{}]", hit.path, size, hit.tags.join(", "));
                }
            }

            eprintln!();
            eprintln!(
                "Found {} results in {:.3}s",
                hits.len(),
                elapsed.as_secs_f64()
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(shown)?);
        }
    }

    Ok(())
}

//! Indexed command - query the operating system's file index.

use crate::app::App;
use crate::OutputFormat;
use sharelens_core::Config;
use std::time::Instant;

/// Run the indexed command.
pub fn run(config: Config, query: &str, output: OutputFormat) -> anyhow::Result<()> {
    let app = App::new(config)?;

    let start = Instant::now();
    let hits = app.indexed.search(query)?;
    let elapsed = start.elapsed();

    match output {
        OutputFormat::Text => {
            for hit in &hits {
                match hit.preview {
                    Some(ref preview) => println!("📄 {}  ->  {}", hit.path, preview),
                    None => println!("📄 {}", hit.path),
                }
            }

            eprintln!();
            eprintln!(
                "Found {} results in {:.3}ms",
                hits.len(),
                elapsed.as_secs_f64() * 1000.0
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
    }

    Ok(())
}

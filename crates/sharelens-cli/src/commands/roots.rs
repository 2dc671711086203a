//! Roots command - show configured shares and their reachability.

use crate::app::App;
use sharelens_core::{Config, DirectoryScanner, TagStore};

/// Run the roots command.
pub fn run(config: Config) -> anyhow::Result<()> {
    let app = App::new(config)?;

    println!("Sharelens Shared Roots");
    println!("======================");
    println!();

    if app.searcher.roots().is_empty() {
        println!("No shared roots configured. Add [[roots]] to the configuration file.");
    }

    for root in app.searcher.roots() {
        match app.scanner.read_dir(&root.path) {
            Ok(_) => println!("  ✓ {} ({})", root.name, root.path.display()),
            Err(e) => println!("  ⚠ {} ({}) {}", root.name, root.path.display(), e),
        }
    }

    let tags_path = app.config.tags_path()?;
    let tags = TagStore::new(&tags_path).load();

    println!();
    println!("Tag store:     {} ({} tagged files)", tags_path.display(), tags.len());
    println!("Preview log:   {}", app.config.preview_log_path()?.display());
    println!("Listening on:  {}", app.config.server.bind);
    if !app.config.exclude.patterns.is_empty() {
        println!("Excluded:      {}", app.config.exclude.patterns.join(", "));
    }

    Ok(())
}

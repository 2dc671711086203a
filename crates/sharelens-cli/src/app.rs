//! Application state management.

use sharelens_core::{
    AviConverter, Config, DirectoryScanner, IndexedSearch, LocalScanner, Searcher,
};
use std::sync::Arc;
use tracing::info;

/// Shared application state, built once from the configuration.
pub struct App {
    /// Configuration
    pub config: Config,

    /// Directory scanner shared by listing and search
    pub scanner: Arc<dyn DirectoryScanner>,

    /// Multi-root search
    pub searcher: Searcher,

    /// OS index search
    pub indexed: IndexedSearch,

    /// AVI to MP4 conversion
    pub converter: AviConverter,
}

impl App {
    /// Create a new application instance.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let scanner: Arc<dyn DirectoryScanner> = Arc::new(LocalScanner::new());
        let searcher = Searcher::from_config(&config, scanner.clone())?;
        let indexed = IndexedSearch::new(config.indexed.clone(), config.server.public_url.clone());
        let converter = AviConverter::new(config.convert.clone());

        info!(
            roots = config.roots.len(),
            tags = %config.tags_path()?.display(),
            scanner = scanner.name(),
            "Application initialized"
        );

        Ok(App {
            config,
            scanner,
            searcher,
            indexed,
            converter,
        })
    }
}

//! Serve command - run the HTTP API.

use crate::app::App;
use crate::server;
use sharelens_core::Config;

/// Run the serve command.
pub fn run(config: Config, bind: Option<String>) -> anyhow::Result<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let app = App::new(config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(server::serve(app, &bind))
}

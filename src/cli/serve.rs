//! Serve the `[[views]]` of the project file.
//!
//! One adapter is built from the project-wide `[options]` (data files and helper
//! templates included) and shared by every route. A view with a `context` file
//! re-reads it on each request, so edits show up without a restart.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::request::Parts;
use clap::Args;
use futures::FutureExt;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::adapter::view::{ContextProvider, ViewError, add_view};
use crate::adapter::{Adapter, AdapterOptions};
use crate::config::ProjectConfig;
use crate::constants::DEFAULT_SERVE_ADDR;

/// Arguments of `stencil serve`.
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to listen on
    #[arg(long, value_name = "ADDR", default_value = DEFAULT_SERVE_ADDR)]
    pub addr: String,
}

impl ServeCommand {
    /// Serves until interrupted.
    pub async fn execute(self, config_path: &Path) -> Result<()> {
        let config = ProjectConfig::load(config_path)?;
        if config.views.is_empty() {
            warn!("No [[views]] defined in {}; every request will get 404", config_path.display());
        }

        let router = build_router(&config, &super::project_dir(config_path))?;

        let listener = TcpListener::bind(&self.addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.addr))?;
        info!("Serving {} view(s) on http://{}", config.views.len(), self.addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
            .context("Server failed")?;
        Ok(())
    }
}

/// Builds the router for the configured views.
pub(crate) fn build_router(config: &ProjectConfig, cwd: &Path) -> Result<Router> {
    let options = config.options.resolve();
    let mut adapter = Adapter::new(AdapterOptions {
        cwd: cwd.to_path_buf(),
        resolve: options.resolve.clone(),
        cache: options.cache,
        extension: options.extension.clone(),
        autoescape: options.autoescape,
    });
    for pattern in &options.data {
        adapter.data_glob(pattern)?;
    }
    for pattern in &options.helpers {
        adapter.register_helpers_glob(pattern)?;
    }

    let adapter = Arc::new(Mutex::new(adapter));
    let mut router = Router::new();
    for view in &config.views {
        let provider = view.context.as_ref().map(|path| json_file_provider(cwd.join(path)));
        router = add_view(router, adapter.clone(), &view.route, view.template.clone(), provider);
        info!("Route {} -> {}", view.route, view.template);
    }
    Ok(router)
}

/// A provider reading a JSON object from `path` on every request.
fn json_file_provider(path: PathBuf) -> ContextProvider {
    Arc::new(move |_parts: Parts| {
        let path = path.clone();
        async move {
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => return Err(ViewError::Context(format!("{}: {e}", path.display()))),
            };
            match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => Ok(Some(map)),
                Ok(_) => Err(ViewError::Context(format!("{} is not a JSON object", path.display()))),
                Err(e) => Err(ViewError::Context(format!("{}: {e}", path.display()))),
            }
        }
        .boxed()
    })
}

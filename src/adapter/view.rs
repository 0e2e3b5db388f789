//! Binding templates to axum routes.
//!
//! [`add_view`] registers a GET route that renders one template with the shared
//! adapter and responds with HTML. The context can be computed per request by an
//! async [`ContextProvider`] receiving the request parts.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::Router;
//! use tokio::sync::Mutex;
//! use stencil_cli::adapter::{Adapter, AdapterOptions};
//! use stencil_cli::adapter::view::add_view;
//!
//! let adapter = Arc::new(Mutex::new(Adapter::new(AdapterOptions::default())));
//! let router: Router<()> = add_view(Router::new(), adapter, "/", "pages/index", None);
//! ```

use std::error::Error as _;
use std::sync::Arc;

use axum::Router;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::warn;

use super::{Adapter, AdapterError, RenderOptions};

/// An adapter shared between request handlers.
pub type SharedAdapter = Arc<Mutex<Adapter>>;

/// Future returned by a [`ContextProvider`].
pub type ContextFuture = BoxFuture<'static, Result<Option<Map<String, Value>>, ViewError>>;

/// Computes the per-request rendering context from the request parts.
pub type ContextProvider = Arc<dyn Fn(Parts) -> ContextFuture + Send + Sync>;

/// Failure while serving a view.
#[derive(Error, Debug)]
pub enum ViewError {
    /// The adapter failed to render the template.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// The context provider failed.
    #[error("Failed to build view context: {0}")]
    Context(String),
}

impl ViewError {
    /// Whether the failure comes from a template file that does not exist.
    pub fn is_not_found(&self) -> bool {
        if matches!(self, Self::Adapter(AdapterError::PartialNotFound { .. })) {
            return true;
        }
        let mut current = self.source();
        while let Some(cause) = current {
            if matches!(cause.downcast_ref::<AdapterError>(), Some(AdapterError::PartialNotFound { .. })) {
                return true;
            }
            current = cause.source();
        }
        false
    }
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        let status = if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        warn!("View failed with {}: {}", status, self);

        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str(&format!("\n  caused by: {cause}"));
            source = cause.source();
        }
        (status, message).into_response()
    }
}

/// Registers a GET route on `router` rendering `template`.
pub fn add_view<S>(
    router: Router<S>,
    adapter: SharedAdapter,
    route: &str,
    template: impl Into<String>,
    provider: Option<ContextProvider>,
) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let template = template.into();
    router.route(
        route,
        get(move |request: Request| {
            let adapter = adapter.clone();
            let template = template.clone();
            let provider = provider.clone();
            async move { render_view(adapter, template, provider, request).await }
        }),
    )
}

async fn render_view(
    adapter: SharedAdapter,
    template: String,
    provider: Option<ContextProvider>,
    request: Request,
) -> Result<Html<String>, ViewError> {
    let (parts, _body) = request.into_parts();
    let context = match provider {
        Some(provider) => provider(parts).await?,
        None => None,
    };

    let mut adapter = adapter.lock().await;
    let html = adapter.render_template(&template, context.as_ref(), RenderOptions::default())?;
    Ok(Html(html))
}

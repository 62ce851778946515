/*!
 * HTTP surface: the generated artifacts as static files plus a landing page.
 */

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use log::{error, info};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::app_config::Config;
use crate::errors::AppError;

/// Landing page compiled into the binary
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/index.html");

/// Values substituted into the landing page template
#[derive(Debug, Clone)]
pub struct PageContext {
    pub playlist_url: String,
    pub subtitles_url: String,
}

impl PageContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            playlist_url: config.playlist_url(),
            subtitles_url: config.subtitles_url(),
        }
    }

    /// Fill `{{playlist_url}}` and `{{subtitles_url}}` placeholders
    pub fn fill(&self, template: &str) -> String {
        template
            .replace("{{playlist_url}}", &self.playlist_url)
            .replace("{{subtitles_url}}", &self.subtitles_url)
    }
}

#[derive(Debug)]
struct PageState {
    template_path: Option<PathBuf>,
    context: PageContext,
}

/// Build the router: `<prefix>/*` from the output directory, `/` for the page
pub fn router(config: &Config) -> Router {
    let state = Arc::new(PageState {
        template_path: config.server.template_path.clone(),
        context: PageContext::from_config(config),
    });

    Router::new()
        .route("/", get(serve_index))
        .nest_service(&config.server.hls_prefix, ServeDir::new(&config.paths.output_dir))
        .with_state(state)
}

// Re-reads the template on each request so edits show up without a restart
async fn serve_index(State(state): State<Arc<PageState>>) -> Response {
    let template = match &state.template_path {
        Some(path) => match tokio::fs::read_to_string(path).await {
            Ok(template) => template,
            Err(e) => {
                error!("Failed to read template {:?}: {}", path, e);
                return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
            }
        },
        None => DEFAULT_TEMPLATE.to_string(),
    };

    (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        state.context.fill(&template),
    )
        .into_response()
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(config: &Config) -> Result<(), AppError> {
    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::Server(format!("failed to bind {}: {}", address, e)))?;

    let local = listener
        .local_addr()
        .map_err(|e| AppError::Server(e.to_string()))?;
    info!("Server listening on {} ...", local);

    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler, keep serving until the process is killed
        std::future::pending::<()>().await;
    }
}

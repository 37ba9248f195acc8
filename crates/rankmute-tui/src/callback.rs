//! Loopback HTTP listener for the login redirect.
//!
//! The backend sends the provider back to `http://<bind>:<port><callback_path>`.
//! Whatever query parameters arrive there are forwarded to the App, which
//! decides what to do with them.

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::login::CallbackParams;

const DONE_PAGE: &str = "<!doctype html><title>rankmute</title>\
<p>Login received. You can close this tab and return to the terminal.</p>";

pub fn router(callback_path: &str, tx: mpsc::Sender<CallbackParams>) -> Router {
    Router::new()
        .route(callback_path, get(on_callback))
        .with_state(tx)
}

/// Bind and serve in a background task.  A bind failure is logged and the
/// task ends; the rest of the app keeps running without login.
pub fn start_server(
    bind_address: String,
    port: u16,
    callback_path: String,
    tx: mpsc::Sender<CallbackParams>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let addr = format!("{}:{}", bind_address, port);
        let listener = match TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to bind login callback listener to {}: {}", addr, e);
                return;
            }
        };
        info!("login callback listening on http://{}{}", addr, callback_path);
        serve(listener, &callback_path, tx).await;
    })
}

pub async fn serve(listener: TcpListener, callback_path: &str, tx: mpsc::Sender<CallbackParams>) {
    if let Err(e) = axum::serve(listener, router(callback_path, tx)).await {
        error!("login callback server error: {}", e);
    }
}

async fn on_callback(
    State(tx): State<mpsc::Sender<CallbackParams>>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    info!(has_code = params.code.is_some(), "login redirect received");
    if tx.send(params).await.is_err() {
        warn!("login redirect arrived after the app stopped listening");
    }
    Html(DONE_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn spawn_listener() -> (String, mpsc::Receiver<CallbackParams>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move { serve(listener, "/app/login/callback", tx).await });
        (format!("http://{}", addr), rx)
    }

    #[tokio::test]
    async fn test_code_is_forwarded() {
        let (base, mut rx) = spawn_listener().await;
        let resp = reqwest::get(format!("{}/app/login/callback?code=abc123", base))
            .await
            .unwrap();
        assert!(resp.status().is_success());
        assert!(resp.text().await.unwrap().contains("close this tab"));

        let params = rx.recv().await.unwrap();
        assert_eq!(params.code.as_deref(), Some("abc123"));
        assert_eq!(params.error, None);
    }

    #[tokio::test]
    async fn test_missing_code_is_still_forwarded() {
        let (base, mut rx) = spawn_listener().await;
        reqwest::get(format!("{}/app/login/callback?error=access_denied", base))
            .await
            .unwrap();
        let params = rx.recv().await.unwrap();
        assert_eq!(params.code, None);
        assert_eq!(params.error.as_deref(), Some("access_denied"));
    }

    #[tokio::test]
    async fn test_other_paths_not_found() {
        let (base, _rx) = spawn_listener().await;
        let resp = reqwest::get(format!("{}/elsewhere", base)).await.unwrap();
        assert_eq!(resp.status().as_u16(), 404);
    }
}

//! Prism - Backend request dispatch
//!
//! Panel requests run as tokio tasks and report back through an unbounded
//! channel. The TUI event loop drains the receiver every frame and applies
//! each response to the panel, which drops stale tokens.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::BackendClient;
use crate::panel::{PanelRequest, PanelResponse};

/// Sending half, cloned into every request task
pub type ResponseSender = mpsc::UnboundedSender<PanelResponse>;

/// Receiving half, polled by the TUI loop
pub type ResponseReceiver = mpsc::UnboundedReceiver<PanelResponse>;

/// Create a new response channel pair
pub fn response_channel() -> (ResponseSender, ResponseReceiver) {
    mpsc::unbounded_channel()
}

/// Run one request to completion against the backend.
pub async fn execute(client: &BackendClient, request: PanelRequest) -> PanelResponse {
    match request {
        PanelRequest::Chat { token, request } => PanelResponse::Chat {
            token,
            result: client.chat(&request).await,
        },
        PanelRequest::Visualize { token, request } => PanelResponse::Visualize {
            token,
            result: client.visualize(&request).await,
        },
        PanelRequest::Report { token, dataset_id } => PanelResponse::Report {
            token,
            result: client.report(&dataset_id).await,
        },
    }
}

/// Spawn `request` in the background. In-flight requests are not cancelled;
/// if the receiver is gone the response is discarded.
pub fn dispatch(
    client: Arc<BackendClient>,
    request: PanelRequest,
    sender: ResponseSender,
) -> JoinHandle<()> {
    debug!("Dispatching request token {}", request.token());
    tokio::spawn(async move {
        let response = execute(&client, request).await;
        let _ = sender.send(response);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChatRequest;
    use crate::panel::{PanelVariant, RemotePanel};
    use crate::testing::spawn_backend;

    #[tokio::test]
    async fn test_dispatch_delivers_response() -> anyhow::Result<()> {
        let base = spawn_backend().await;
        let client = Arc::new(BackendClient::new(&base)?);
        let (tx, mut rx) = response_channel();

        let mut panel = RemotePanel::new(PanelVariant::Linked, Some("sales".into()));
        panel.chat.question = "trend?".into();
        let request = panel.send_question().expect("request issued");

        dispatch(client, request, tx).await?;
        let response = rx.recv().await.expect("one response");
        assert!(panel.apply(response));
        assert_eq!(panel.chat.answer.as_deref(), Some("sales: trend?"));
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_report_failure() -> anyhow::Result<()> {
        let base = spawn_backend().await;
        let client = BackendClient::new(&base)?;
        let response = execute(
            &client,
            PanelRequest::Report {
                token: 7,
                dataset_id: "missing".into(),
            },
        )
        .await;
        assert!(matches!(response, PanelResponse::Report { token: 7, result: Err(_) }));

        let response = execute(
            &client,
            PanelRequest::Chat {
                token: 8,
                request: ChatRequest {
                    dataset_id: "d".into(),
                    question: "silent".into(),
                },
            },
        )
        .await;
        assert!(matches!(response, PanelResponse::Chat { token: 8, result: Err(_) }));
        Ok(())
    }
}

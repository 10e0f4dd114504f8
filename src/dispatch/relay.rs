use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::message::OutboundMessage;
use super::DispatchError;

/// Port to the service that actually delivers mail.
#[async_trait]
pub trait MailRelay: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), DispatchError>;
}

// Thin wrapper around reqwest for the mail relay endpoint.
#[derive(Clone)]
pub struct HttpMailRelay {
    http: Client,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct RelayErrorResponse {
    error: Option<String>,
    message: Option<String>,
}

impl HttpMailRelay {
    pub fn new(http: Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl MailRelay for HttpMailRelay {
    async fn send(&self, message: &OutboundMessage) -> Result<(), DispatchError> {
        let res = self
            .http
            .post(self.endpoint.clone())
            .json(message)
            .send()
            .await
            .map_err(DispatchError::Transport)?;
        let status = res.status();

        // Keep the relay's explanation for the log.
        if !status.is_success() {
            let message = res
                .json::<RelayErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error.or(body.message));
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        log::info!(
            "Mail relay accepted message '{}' for {} recipient(s)",
            message.subject,
            message.to.len()
        );
        Ok(())
    }
}

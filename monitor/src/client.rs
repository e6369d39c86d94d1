use std::{future::Future, time::Duration};

use greenhouse_common::{
    decode_snapshot_bytes, ClientConfig, ControlCommand, DecodeError, SensorSnapshot,
    FORM_RUNNING, PATH_STATUS,
};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote service answered HTTP {0}")]
    RemoteStatus(u16),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Read side of the remote service.
pub trait SnapshotSource: Send + Sync + 'static {
    fn fetch_snapshot(&self) -> impl Future<Output = Result<SensorSnapshot, ClientError>> + Send;
}

/// Write side of the remote service.
///
/// `Ok(())` means the request went out. The response is never inspected; the
/// next snapshot is the only evidence that a command took effect.
pub trait CommandSink: Send + Sync + 'static {
    fn send_command(
        &self,
        command: ControlCommand,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl SnapshotSource for RemoteClient {
    async fn fetch_snapshot(&self) -> Result<SensorSnapshot, ClientError> {
        let url = format!("{}{PATH_STATUS}", self.base_url);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::RemoteStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(decode_snapshot_bytes(&body)?)
    }
}

impl CommandSink for RemoteClient {
    async fn send_command(&self, command: ControlCommand) -> Result<(), ClientError> {
        let url = format!("{}{}", self.base_url, command.endpoint.path());
        self.http
            .post(&url)
            .form(&[(FORM_RUNNING, command.form_value())])
            .send()
            .await?;

        debug!(
            endpoint = command.endpoint.path(),
            running = command.desired_state,
            "command sent"
        );
        Ok(())
    }
}

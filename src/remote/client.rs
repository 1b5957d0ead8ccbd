use std::time::Duration;

use reqwest::header::HeaderValue;

use crate::error::RemoteError;
use crate::protocol::dacp::{ACTIVE_REMOTE_HEADER, CommandResult, DacpCommand};
use crate::types::RemoteEndpoint;

/// HTTP client for DACP commands
///
/// Sources serve DACP on the local network, so certificates are not
/// verified. Failed requests are returned to the caller and never retried.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
}

impl RemoteClient {
    /// Time allowed for one command
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Create a client with the default timeout
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Client` if the HTTP client cannot be built.
    pub fn new() -> Result<Self, RemoteError> {
        Self::with_timeout(Self::REQUEST_TIMEOUT)
    }

    /// Create a client with a custom request timeout
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Client` if the HTTP client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()
            .map_err(RemoteError::Client)?;
        Ok(Self { http })
    }

    /// Send `command` to `endpoint`
    ///
    /// Any HTTP answer is a [`CommandResult`]; only transport failures are
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Request` if the source cannot be reached, or
    /// `RemoteError::InvalidToken` if the token is not a valid header value.
    pub async fn send(
        &self,
        endpoint: &RemoteEndpoint,
        command: DacpCommand,
    ) -> Result<CommandResult, RemoteError> {
        let url = endpoint.command_url(command);
        let token = HeaderValue::from_str(&endpoint.auth_token)
            .map_err(|_| RemoteError::InvalidToken(endpoint.auth_token.clone()))?;

        tracing::debug!(
            url = %url,
            command = %command,
            "Sending DACP command: {}",
            command.description()
        );

        let response = self
            .http
            .get(&url)
            .header(ACTIVE_REMOTE_HEADER, token)
            .send()
            .await
            .map_err(|source| RemoteError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let result = CommandResult::from_status(status.as_u16(), status.canonical_reason());
        if !result.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "DACP command not accepted");
        }
        Ok(result)
    }
}

/// Remote control bound to one source
#[derive(Debug, Clone)]
pub struct RemoteControl {
    endpoint: RemoteEndpoint,
    client: RemoteClient,
}

impl RemoteControl {
    /// Control `endpoint` with a default client
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Client` if the HTTP client cannot be built.
    pub fn new(endpoint: RemoteEndpoint) -> Result<Self, RemoteError> {
        Ok(Self::with_client(endpoint, RemoteClient::new()?))
    }

    /// Control `endpoint` through an existing client
    #[must_use]
    pub fn with_client(endpoint: RemoteEndpoint, client: RemoteClient) -> Self {
        Self { endpoint, client }
    }

    /// The controlled endpoint
    #[must_use]
    pub fn endpoint(&self) -> &RemoteEndpoint {
        &self.endpoint
    }

    /// Send a command
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::Network` if the source cannot be reached.
    /// Discover the endpoint again when [`MetadataError::is_connection_lost`]
    /// is true.
    ///
    /// [`MetadataError::is_connection_lost`]: crate::MetadataError::is_connection_lost
    pub async fn send(&self, command: DacpCommand) -> crate::Result<CommandResult> {
        Ok(self.client.send(&self.endpoint, command).await?)
    }

    /// Toggle play/pause
    ///
    /// # Errors
    ///
    /// See [`RemoteControl::send`].
    pub async fn play_pause(&self) -> crate::Result<CommandResult> {
        self.send(DacpCommand::PlayPause).await
    }

    /// Skip to the next track
    ///
    /// # Errors
    ///
    /// See [`RemoteControl::send`].
    pub async fn next_item(&self) -> crate::Result<CommandResult> {
        self.send(DacpCommand::NextItem).await
    }

    /// Go back to the previous track
    ///
    /// # Errors
    ///
    /// See [`RemoteControl::send`].
    pub async fn prev_item(&self) -> crate::Result<CommandResult> {
        self.send(DacpCommand::PrevItem).await
    }
}

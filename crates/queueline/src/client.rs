//! The authenticated GraphQL client.
//!
//! Every request the SDK makes goes through [`GraphQlClient::execute`]:
//!
//! ```text
//! read token ──→ encode ──→ send ──→ 401/403? ──→ decode ──→ auth error? ──→ data
//!                                       │                       │
//!                                       └──── clear session ────┘──→ Unauthorized
//! ```
//!
//! Authorization failures are recognized here, in one place, and turned
//! into [`QueuelineError::Unauthorized`] after the session is cleared.

use std::sync::Arc;

use queueline_protocol::{Codec, GraphQlRequest, JsonCodec, Operation, ProtocolError, RawResponse};
use queueline_session::{KeyValueStore, SessionStore};
use queueline_transport::{HttpRequest, HttpTransport, Transport};
use tracing::{debug, info, warn};

use crate::{ClientConfig, QueuelineError};

/// Sends typed GraphQL operations with the current session token.
///
/// Stateless apart from what it borrows: the token is re-read from the
/// [`SessionStore`] for every request, so a login or logout is picked up
/// by the very next call.
pub struct GraphQlClient<T, K> {
    transport: T,
    session: Arc<SessionStore<K>>,
    codec: JsonCodec,
}

impl<K: KeyValueStore> GraphQlClient<HttpTransport, K> {
    /// Builds an HTTP-backed client from `config`.
    pub fn connect(config: &ClientConfig, session: SessionStore<K>) -> Result<Self, QueuelineError> {
        let transport = HttpTransport::new(config.http_config())?;
        Ok(Self::new(transport, Arc::new(session)))
    }
}

impl<T: Transport, K: KeyValueStore> GraphQlClient<T, K> {
    pub fn new(transport: T, session: Arc<SessionStore<K>>) -> Self {
        Self {
            transport,
            session,
            codec: JsonCodec,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore<K>> {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs operation `O` and returns its `data`.
    ///
    /// # Errors
    /// - [`QueuelineError::Transport`]: no response arrived.
    /// - [`QueuelineError::Unauthorized`]: HTTP 401/403 or an
    ///   authorization error in the body. The session is cleared first.
    /// - [`QueuelineError::Rejected`]: any other GraphQL error.
    /// - [`QueuelineError::Http`]: a failure status with an unreadable body.
    /// - [`QueuelineError::Protocol`]: an unreadable body, or one with
    ///   neither data nor errors.
    pub async fn execute<O: Operation>(
        &self,
        variables: &O::Variables,
    ) -> Result<O::Data, QueuelineError> {
        let token = self.session.get_token().await;
        let authenticated = token.is_some();

        let body = self
            .codec
            .encode(&GraphQlRequest::for_operation::<O>(variables))?;
        let mut request = HttpRequest::new(body);
        if let Some(token) = token {
            request = request.with_authorization(format!("JWT {token}"));
        }
        let id = request.id;

        debug!(
            %id,
            operation = O::NAME,
            mutation = O::IS_MUTATION,
            authenticated,
            "sending operation"
        );

        let response = self.transport.send(request).await?;

        if response.is_auth_failure() {
            self.reject_session(O::NAME, response.status).await;
            return Err(QueuelineError::Unauthorized);
        }

        let decoded: RawResponse = match self.codec.decode(&response.body) {
            Ok(decoded) => decoded,
            Err(_) if !response.is_success() => {
                return Err(QueuelineError::Http {
                    status: response.status,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if decoded.is_unauthorized() {
            self.reject_session(O::NAME, response.status).await;
            return Err(QueuelineError::Unauthorized);
        }

        if !decoded.errors.is_empty() {
            let messages = decoded.error_messages();
            debug!(%id, operation = O::NAME, ?messages, "operation rejected");
            return Err(QueuelineError::Rejected { messages });
        }

        match decoded.typed_data::<O::Data>()? {
            Some(data) => Ok(data),
            None if !response.is_success() => Err(QueuelineError::Http {
                status: response.status,
            }),
            None => Err(ProtocolError::InvalidResponse(format!(
                "{} returned neither data nor errors",
                O::NAME
            ))
            .into()),
        }
    }

    async fn reject_session(&self, operation: &'static str, status: u16) {
        info!(operation, status, "server rejected session, clearing it");
        if let Err(e) = self.session.clear_session().await {
            warn!(error = %e, "could not clear rejected session");
        }
    }
}

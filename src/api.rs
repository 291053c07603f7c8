// API client module: a small blocking HTTP client for one Misskey instance.
// Covers the two calls this tool needs: the MiAuth check that exchanges an
// approved session for a token, and `notes/create`.

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::{Credential, Session};
use crate::error::{Error, Result};
use crate::note::{CreateResponse, PublishRequest, PublishResult};

/// Client bound to a single instance. Requests go to `https://{host}` unless
/// a different base URL is given.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    host: String,
    base_url: String,
}

/// Response of `miauth/{session}/check` once the session has been approved.
#[derive(Deserialize, Debug)]
struct CheckResponse {
    token: String,
}

impl ApiClient {
    /// Client for `https://{host}`.
    pub fn new(host: &str) -> Result<Self> {
        Self::with_base_url(host, format!("https://{}", host))
    }

    /// Client for `host` that sends its requests to `base_url` instead.
    pub fn with_base_url(host: &str, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(ApiClient {
            client,
            host: host.to_string(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Exchange an approved MiAuth session for a credential.
    ///
    /// Sent once, after the user has confirmed approval in the browser. A
    /// non-200 answer is an [`Error::Auth`]; a body without a `token` is an
    /// [`Error::Protocol`].
    pub fn check_authorization(&self, session: &Session) -> Result<Credential> {
        let url = format!("{}/api/miauth/{}/check", self.base_url, session.id());
        debug!(%url, "checking MiAuth session");

        let res = self.client.post(&url).send()?;
        let status = res.status();
        debug!(%status, "MiAuth check answered");
        if status != StatusCode::OK {
            return Err(Error::Auth(format!("instance answered {}", status)));
        }

        let body: CheckResponse = decode(res)?;
        if body.token.is_empty() {
            return Err(Error::Auth("instance returned an empty token".into()));
        }

        info!(host = %self.host, "MiAuth session approved");
        Ok(Credential::new(self.host.clone(), body.token))
    }

    /// POST the note to `api/notes/create` and return the created note's id.
    pub fn publish(&self, req: &PublishRequest) -> Result<PublishResult> {
        let url = format!("{}/api/notes/create", self.base_url);
        debug!(%url, "creating note");

        let res = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(serde_json::to_vec(req).map_err(|e| Error::Protocol(e.to_string()))?)
            .send()?;

        let status = res.status();
        if status != StatusCode::OK {
            debug!(%status, "note creation rejected");
            return Err(Error::Publish { status });
        }

        let body: CreateResponse = decode(res)?;
        info!(note_id = %body.created_note.id, "note created");
        Ok(body.into())
    }
}

/// Read the whole body, then decode it. Read failures are transport errors,
/// decode failures are protocol errors.
fn decode<T: DeserializeOwned>(res: Response) -> Result<T> {
    let text = res.text()?;
    serde_json::from_str(&text).map_err(|e| Error::Protocol(e.to_string()))
}

// MiAuth session handling: session ids, the authorization URL the user opens
// in a browser, and the credential obtained once the session is approved.
// Nothing in here touches the network; the check call lives in `api`.

use url::form_urlencoded;
use uuid::Uuid;

/// Permission needed to compose notes.
pub const WRITE_NOTES: &str = "write:notes";

/// Generate a fresh MiAuth session id (random UUIDv4, 122 bits of entropy).
#[must_use]
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// A single MiAuth authorization attempt. Consumed by the check call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
}

impl Session {
    /// Start a new session with a freshly generated id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: new_session_id(),
        }
    }

    /// Wrap an existing session id.
    #[must_use]
    pub fn from_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// What the instance shows the user on the approval page.
///
/// Empty fields are left out of the URL entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MiAuthConfig {
    pub name: String,
    pub icon: String,
    pub callback: String,
    pub permission: Vec<String>,
}

impl MiAuthConfig {
    /// Configuration used by the setup flow: app name and note-writing scope.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permission: vec![WRITE_NOTES.to_string()],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    #[must_use]
    pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = callback.into();
        self
    }

    /// Replace the requested scopes. Order is kept as given.
    #[must_use]
    pub fn with_permission(mut self, permission: Vec<String>) -> Self {
        self.permission = permission;
        self
    }
}

/// Build `https://{host}/miauth/{session}` with the configured query parameters.
///
/// Parameters are emitted in key order (`callback`, `icon`, `name`,
/// `permission`) and form-encoded. The host is not validated.
#[must_use]
pub fn authorization_url(host: &str, session: &Session, config: &MiAuthConfig) -> String {
    let mut url = format!("https://{}/miauth/{}", host, session.id());

    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in [
        ("callback", &config.callback),
        ("icon", &config.icon),
        ("name", &config.name),
    ] {
        if !value.is_empty() {
            query.append_pair(key, value);
        }
    }
    if !config.permission.is_empty() {
        query.append_pair("permission", &config.permission.join(","));
    }

    let query = query.finish();
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }
    url
}

/// Host plus access token, as stored in the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub host: String,
    pub token: String,
}

impl Credential {
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: token.into(),
        }
    }
}

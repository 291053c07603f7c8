// Note composition: turns the audience selection and modifiers given on the
// command line into the JSON body expected by `notes/create`.

use serde::{Deserialize, Serialize};

use crate::auth::Credential;
use crate::error::{Error, Result};

/// Who may see a note.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Audience {
    /// Instance default; no `visibility` field is sent.
    #[default]
    Public,
    HomeTimeline,
    Followers,
    /// Only the listed users, in the order given.
    Direct(Vec<String>),
}

/// Raw audience flags as they come from the command line.
///
/// More than one may be set if the caller did not enforce exclusivity;
/// `resolve` then picks by priority `Direct > Followers > HomeTimeline > Public`.
/// Public is what remains when nothing else is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudienceFlags {
    pub home_timeline: bool,
    pub followers: bool,
    pub direct: Vec<String>,
}

impl AudienceFlags {
    pub fn resolve(&self) -> Audience {
        if !self.direct.is_empty() {
            Audience::Direct(self.direct.clone())
        } else if self.followers {
            Audience::Followers
        } else if self.home_timeline {
            Audience::HomeTimeline
        } else {
            Audience::Public
        }
    }
}

/// Audience and modifiers for one note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteOptions {
    pub audience: Audience,
    /// Empty means no content warning.
    pub content_warning: String,
    pub local_only: bool,
}

impl NoteOptions {
    pub fn build(&self, credential: &Credential, text: &str) -> Result<PublishRequest> {
        build_publish_request(
            credential,
            text,
            self.audience.clone(),
            &self.content_warning,
            self.local_only,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Home,
    Followers,
    Specified,
}

/// Body of a `notes/create` call. Optional fields that are unset are left
/// out of the JSON rather than sent as empty values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishRequest {
    i: String,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    visibility: Option<Visibility>,
    #[serde(rename = "visibleUserIds", skip_serializing_if = "Option::is_none")]
    visible_user_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cw: Option<String>,
    #[serde(rename = "localOnly", skip_serializing_if = "std::ops::Not::not")]
    local_only: bool,
}

impl PublishRequest {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn visible_user_ids(&self) -> Option<&[String]> {
        self.visible_user_ids.as_deref()
    }
}

/// Validate the note and map the audience and modifiers onto a request body.
///
/// Fails with [`Error::Validation`] when `text` is blank or a direct note has
/// no recipients. The text itself is sent untrimmed.
pub fn build_publish_request(
    credential: &Credential,
    text: &str,
    audience: Audience,
    content_warning: &str,
    local_only: bool,
) -> Result<PublishRequest> {
    if text.trim().is_empty() {
        return Err(Error::Validation("empty text".into()));
    }

    let (visibility, visible_user_ids) = match audience {
        Audience::Direct(ids) if ids.is_empty() => {
            return Err(Error::Validation("direct note without recipients".into()));
        }
        Audience::Direct(ids) => (Some(Visibility::Specified), Some(ids)),
        Audience::Followers => (Some(Visibility::Followers), None),
        Audience::HomeTimeline => (Some(Visibility::Home), None),
        Audience::Public => (None, None),
    };

    Ok(PublishRequest {
        i: credential.token.clone(),
        text: text.to_string(),
        visibility,
        visible_user_ids,
        cw: (!content_warning.is_empty()).then(|| content_warning.to_string()),
        local_only,
    })
}

/// The created note. Only its id is used.
#[derive(Debug, Clone, Deserialize)]
pub struct Note {
    pub id: String,
}

/// Response of `notes/create`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateResponse {
    #[serde(rename = "createdNote")]
    pub created_note: Note,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub created_note_id: String,
}

impl From<CreateResponse> for PublishResult {
    fn from(res: CreateResponse) -> Self {
        Self {
            created_note_id: res.created_note.id,
        }
    }
}

/// Public URL of a published note.
pub fn permalink(host: &str, note_id: &str) -> String {
    format!("https://{}/notes/{}", host, note_id)
}

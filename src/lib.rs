// Library root
// -----------
// Misskey note client. The binary (`main.rs`) parses arguments and hands
// over to `ui::run`.
//
// Module responsibilities:
// - `auth`: MiAuth session ids, authorization URL, credential type.
// - `note`: audience selection and the `notes/create` request body.
// - `api`: blocking HTTP client for the MiAuth check and note creation.
// - `config`: the hosts file holding hostname and token.
// - `cli`: command-line arguments.
// - `ui`: prompts, first-run setup and the post flow.
pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod note;
pub mod ui;

pub use error::{Error, Result};

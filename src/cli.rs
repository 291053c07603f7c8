// Command-line arguments. The audience flags are mutually exclusive through
// an `ArgGroup`; `AudienceFlags::resolve` still applies its own priority.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::note::{AudienceFlags, NoteOptions};

const EXAMPLES: &str = "\
Examples:
  $ mi Hello world!
  $ mi --cw Read? It's nsfw!
  $ mi --direct \"misskey,misskey@example.com\" Hello Misskey!";

/// CLI tool for sending Misskey notes.
#[derive(Parser, Debug, Clone)]
#[command(name = "mi", version, about, after_help = EXAMPLES)]
#[command(group(
    ArgGroup::new("audience")
        .args(["public", "home_timeline", "followers", "direct"])
        .multiple(false)
))]
pub struct Cli {
    /// Note text. Read interactively when omitted
    pub text: Vec<String>,

    /// Publish note to all users (default)
    #[arg(short, long)]
    pub public: bool,

    /// Publish note to home timeline
    #[arg(short = 't', long = "timeline")]
    pub home_timeline: bool,

    /// Publish note to followers
    #[arg(short, long)]
    pub followers: bool,

    /// Publish note to specified users (comma separated, repeatable)
    #[arg(short, long, value_delimiter = ',', value_name = "USERS")]
    pub direct: Vec<String>,

    /// Only send note to local
    #[arg(short, long)]
    pub local_only: bool,

    /// Set contents warning
    #[arg(short = 'w', long, value_name = "TEXT")]
    pub cw: Option<String>,

    /// Set the host and access token
    #[arg(long)]
    pub init: bool,

    /// Path of the hosts file
    #[arg(long, env = "MI_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Text given on the command line, words joined by a space.
    pub fn note_text(&self) -> Option<String> {
        (!self.text.is_empty()).then(|| self.text.join(" "))
    }

    pub fn audience_flags(&self) -> AudienceFlags {
        AudienceFlags {
            home_timeline: self.home_timeline,
            followers: self.followers,
            direct: self
                .direct
                .iter()
                .map(|id| id.trim())
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn note_options(&self) -> NoteOptions {
        NoteOptions {
            audience: self.audience_flags().resolve(),
            content_warning: self.cw.clone().unwrap_or_default(),
            local_only: self.local_only,
        }
    }
}

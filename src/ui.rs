// UI layer: terminal prompts via `dialoguer`, the first-run setup flow and
// the post flow. Everything here is synchronous; one run sends at most one
// authorization check and one note.

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use std::io::{self, BufRead, IsTerminal, Read};
use std::process::Command;
use std::time::Duration;
use tracing::warn;

use crate::api::ApiClient;
use crate::auth::{authorization_url, Credential, MiAuthConfig, Session};
use crate::cli::Cli;
use crate::config::ConfigStore;
use crate::note::{permalink, NoteOptions};

/// Name shown on the MiAuth approval page.
pub const APP_NAME: &str = "mi";

const AUTH_MIAUTH: &str = "MiAuth";
const AUTH_TOKEN: &str = "Access Token";

const PLACEHOLDERS: [&str; 6] = [
    "What are you up to",
    "What's happening around you",
    "What's on your mind",
    "What do you want to say",
    "Start writing...",
    "Waiting for you to write...",
];

/// Interactive input used by the setup and post flows.
pub trait Prompt {
    fn input(&mut self, prompt: &str) -> io::Result<String>;
    fn select(&mut self, prompt: &str, options: &[&str]) -> io::Result<String>;
    fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool>;
    /// Free-form text spanning several lines.
    fn multiline(&mut self, placeholder: &str) -> io::Result<String>;

    /// Show `url` to the user in a browser.
    fn open_url(&mut self, url: &str) -> io::Result<()> {
        open_browser(url)
    }
}

/// `Prompt` backed by the real terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn input(&mut self, prompt: &str) -> io::Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map(|s| s.trim().to_string())
    }

    fn select(&mut self, prompt: &str, options: &[&str]) -> io::Result<String> {
        let idx = Select::new()
            .with_prompt(prompt)
            .items(options)
            .default(0)
            .interact()?;
        Ok(options[idx].to_string())
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool> {
        Confirm::new().with_prompt(prompt).default(default).interact()
    }

    /// Reads until an empty line (or EOF). Piped input is read whole.
    fn multiline(&mut self, placeholder: &str) -> io::Result<String> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            let mut text = String::new();
            stdin.lock().read_to_string(&mut text)?;
            return Ok(text.trim_end().to_string());
        }

        println!("{}", placeholder.dark_grey());
        println!("{}", "(finish with an empty line)".dark_grey());
        let mut lines = Vec::new();
        for line in stdin.lock().lines() {
            let line = line?;
            if line.is_empty() {
                break;
            }
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }
}

/// Open `url` in the system browser without waiting for it.
pub fn open_browser(url: &str) -> io::Result<()> {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/c", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };
    cmd.arg(url).spawn().map(|_| ())
}

pub fn random_placeholder() -> &'static str {
    PLACEHOLDERS[rand::rng().random_range(0..PLACEHOLDERS.len())]
}

/// Entry point of the binary once arguments are parsed.
pub fn run(cli: &Cli, prompt: &mut impl Prompt) -> Result<()> {
    let store = match &cli.config {
        Some(path) => ConfigStore::at(path),
        None => ConfigStore::open()?,
    };

    if cli.init {
        setup(prompt, &store)?;
        return Ok(());
    }

    let entry = store
        .load()
        .with_context(|| format!("Failed to load {}", store.path().display()))?;
    let credential = match entry.credential() {
        Some(credential) => credential,
        None => {
            println!("It seems like it's being executed for the first time.");
            println!("To use this tool, you must set the hostname and access token.");
            if !prompt.confirm("Would you like to set it now?", true)? {
                return Ok(());
            }
            match setup(prompt, &store)? {
                Some(credential) => credential,
                None => return Ok(()),
            }
        }
    };

    let text = match cli.note_text() {
        Some(text) => text,
        None => prompt.multiline(random_placeholder())?,
    };
    if text.trim().is_empty() {
        println!("The note is empty.");
        return Ok(());
    }

    let client = ApiClient::new(&credential.host)?;
    let url = post(&client, &credential, &text, &cli.note_options())?;
    println!("Your note was sent: {}", url.green());
    Ok(())
}

/// Build and send the note, returning its permalink.
pub fn post(
    client: &ApiClient,
    credential: &Credential,
    text: &str,
    options: &NoteOptions,
) -> Result<String> {
    let request = options.build(credential, text)?;
    let result = with_spinner("Sending note...", || client.publish(&request))
        .context("Failed to send note")?;
    Ok(permalink(client.host(), &result.created_note_id))
}

/// Ask for hostname and credential, then save them. Returns `None` if the
/// user left a required field empty; nothing is saved in that case, nor when
/// the MiAuth check fails.
pub fn setup(prompt: &mut impl Prompt, store: &ConfigStore) -> Result<Option<Credential>> {
    setup_with(prompt, store, ApiClient::new)
}

/// [`setup`] with the client for the MiAuth check built by `connect`.
pub fn setup_with<F>(
    prompt: &mut impl Prompt,
    store: &ConfigStore,
    connect: F,
) -> Result<Option<Credential>>
where
    F: FnOnce(&str) -> crate::Result<ApiClient>,
{
    println!("Enter the hostname you wish to use. For example, \"misskey.io\".");
    let hostname = prompt.input("Hostname")?;
    if hostname.is_empty() {
        println!("Please enter the hostname.");
        return Ok(None);
    }

    println!("Choose the authentication method.");
    let method = prompt.select("Authentication method", &[AUTH_MIAUTH, AUTH_TOKEN])?;
    let token = if method == AUTH_MIAUTH {
        mi_auth(prompt, &hostname, connect)?
    } else {
        println!("Enter the access token. \"Compose and delete notes\" permission is required.");
        let token = prompt.input("Access Token")?;
        if token.is_empty() {
            println!("Please enter the access token.");
            return Ok(None);
        }
        token
    };

    store
        .save(&hostname, &token)
        .with_context(|| format!("Failed to write {}", store.path().display()))?;
    println!("Initialization has been completed!");
    Ok(Some(Credential::new(hostname, token)))
}

fn mi_auth<F>(prompt: &mut impl Prompt, hostname: &str, connect: F) -> Result<String>
where
    F: FnOnce(&str) -> crate::Result<ApiClient>,
{
    let session = Session::new();
    let url = authorization_url(hostname, &session, &MiAuthConfig::new(APP_NAME));

    println!("Please access the following URL and authenticate.");
    println!("{}", url);
    if let Err(e) = prompt.open_url(&url) {
        warn!(error = %e, "could not open browser");
    }

    // only for waiting
    prompt.input("Press Enter after authentication.")?;

    let client = connect(hostname)?;
    let credential = with_spinner("Checking authorization...", || {
        client.check_authorization(&session)
    })
    .context("MiAuth failed")?;
    Ok(credential.token)
}

fn with_spinner<T>(msg: &'static str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(msg);
    spinner.enable_steady_tick(Duration::from_millis(80));
    let out = f();
    spinner.finish_and_clear();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::VecDeque;
    use std::io::Write;
    use std::net::TcpListener;
    use std::path::{Path, PathBuf};
    use std::thread::{self, JoinHandle};

    /// Answers prompts from a fixed script, in order.
    #[derive(Default)]
    struct Scripted {
        inputs: VecDeque<String>,
        selects: VecDeque<String>,
        confirms: VecDeque<bool>,
        multiline: Option<String>,
        asked: Vec<String>,
        opened: Vec<String>,
    }

    impl Prompt for Scripted {
        fn input(&mut self, prompt: &str) -> io::Result<String> {
            self.asked.push(prompt.to_string());
            Ok(self.inputs.pop_front().unwrap_or_default())
        }

        fn open_url(&mut self, url: &str) -> io::Result<()> {
            self.opened.push(url.to_string());
            Ok(())
        }

        fn select(&mut self, _: &str, options: &[&str]) -> io::Result<String> {
            Ok(self
                .selects
                .pop_front()
                .unwrap_or_else(|| options[0].to_string()))
        }

        fn confirm(&mut self, _: &str, default: bool) -> io::Result<bool> {
            Ok(self.confirms.pop_front().unwrap_or(default))
        }

        fn multiline(&mut self, _: &str) -> io::Result<String> {
            Ok(self.multiline.take().unwrap_or_default())
        }
    }

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("mi-cli-ui-{}", uuid::Uuid::new_v4()))
            .join("hosts.toml")
    }

    /// Accept one connection, answer 200 with `body`, return the request line.
    fn serve_once(body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = io::BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line.trim_end().is_empty() {
                    break;
                }
            }
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            )
            .unwrap();
            request_line.trim_end().to_string()
        });

        (base_url, handle)
    }

    fn miauth_prompt() -> Scripted {
        Scripted {
            inputs: VecDeque::from(["misskey.test".to_string(), String::new()]),
            selects: VecDeque::from([AUTH_MIAUTH.to_string()]),
            ..Default::default()
        }
    }

    fn cli_with(path: &Path, args: &[&str]) -> Cli {
        let path = path.to_str().unwrap();
        Cli::try_parse_from(["mi", "--config", path].iter().chain(args.iter())).unwrap()
    }

    #[test]
    fn test_setup_with_access_token_saves_config() {
        let store = ConfigStore::at(scratch_path());
        let mut prompt = Scripted {
            inputs: VecDeque::from(["misskey.io".to_string(), "tok".to_string()]),
            selects: VecDeque::from([AUTH_TOKEN.to_string()]),
            ..Default::default()
        };

        let credential = setup(&mut prompt, &store).unwrap();

        assert_eq!(credential, Some(Credential::new("misskey.io", "tok")));
        let entry = store.load().unwrap();
        assert_eq!(entry.hostname, "misskey.io");
        assert_eq!(entry.token, "tok");
    }

    #[test]
    fn test_setup_with_miauth_checks_session_once_and_saves_token() {
        let (base_url, server) = serve_once(r#"{"ok":true,"token":"tok-1"}"#);
        let store = ConfigStore::at(scratch_path());
        let mut prompt = miauth_prompt();

        let credential = setup_with(&mut prompt, &store, move |host: &str| {
            ApiClient::with_base_url(host, base_url)
        })
        .unwrap();
        let request_line = server.join().unwrap();

        assert_eq!(credential, Some(Credential::new("misskey.test", "tok-1")));
        assert_eq!(
            prompt.asked,
            ["Hostname", "Press Enter after authentication."]
        );

        assert_eq!(prompt.opened.len(), 1);
        let session_id = prompt.opened[0]
            .strip_prefix("https://misskey.test/miauth/")
            .and_then(|rest| rest.split('?').next())
            .unwrap();
        assert!(prompt.opened[0].ends_with("?name=mi&permission=write%3Anotes"));
        assert_eq!(
            request_line,
            format!("POST /api/miauth/{}/check HTTP/1.1", session_id)
        );

        let entry = store.load().unwrap();
        assert_eq!(entry.hostname, "misskey.test");
        assert_eq!(entry.token, "tok-1");
    }

    #[test]
    fn test_setup_with_unapproved_miauth_saves_nothing() {
        let (base_url, server) = serve_once(r#"{"ok":false}"#);
        let store = ConfigStore::at(scratch_path());
        let mut prompt = miauth_prompt();

        let err = setup_with(&mut prompt, &store, move |host: &str| {
            ApiClient::with_base_url(host, base_url)
        })
        .unwrap_err();
        server.join().unwrap();

        assert!(matches!(
            err.downcast_ref::<crate::Error>(),
            Some(crate::Error::Protocol(_))
        ));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_setup_empty_hostname_saves_nothing() {
        let store = ConfigStore::at(scratch_path());
        let mut prompt = Scripted::default();

        assert_eq!(setup(&mut prompt, &store).unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_setup_empty_token_saves_nothing() {
        let store = ConfigStore::at(scratch_path());
        let mut prompt = Scripted {
            inputs: VecDeque::from(["misskey.io".to_string(), String::new()]),
            selects: VecDeque::from([AUTH_TOKEN.to_string()]),
            ..Default::default()
        };

        assert_eq!(setup(&mut prompt, &store).unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_declining_first_run_setup_exits_cleanly() {
        let path = scratch_path();
        let cli = cli_with(&path, &["hello"]);
        let mut prompt = Scripted {
            confirms: VecDeque::from([false]),
            ..Default::default()
        };

        run(&cli, &mut prompt).unwrap();

        let entry = ConfigStore::at(&path).load().unwrap();
        assert!(!entry.is_configured());
    }

    #[test]
    fn test_blank_note_is_not_sent() {
        let path = scratch_path();
        ConfigStore::at(&path).save("invalid.invalid", "tok").unwrap();
        let cli = cli_with(&path, &[]);
        let mut prompt = Scripted {
            multiline: Some("   \n".to_string()),
            ..Default::default()
        };

        run(&cli, &mut prompt).unwrap();
    }

    #[test]
    fn test_random_placeholder_comes_from_list() {
        assert!(PLACEHOLDERS.contains(&random_placeholder()));
    }
}

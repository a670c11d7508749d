//! CLI - Command Line Interface for artfolio
//!
//! Every admin action of the TUI is scriptable, and every listing is
//! JSON-parseable with `--json`.
//!
//! # Examples
//!
//! ```bash
//! # Browse content
//! artfolio categories
//! artfolio media portraits --json
//!
//! # Admin
//! artfolio upload portraits ./works/*.jpg
//! artfolio set-cover portraits 6f1c...
//! artfolio delete-media 6f1c... --yes
//! ```

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;

use crate::api::BackendError;
use crate::models::Locale;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    /// General error
    Error = 1,
    InvalidArgs = 2,
    NetworkError = 3,
    /// Category or media item not found
    NotFound = 4,
    /// Admin capability required
    Forbidden = 5,
    /// Confirmation declined
    Aborted = 6,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

impl From<&BackendError> for ExitCode {
    fn from(err: &BackendError) -> ExitCode {
        match err {
            BackendError::NotFound => ExitCode::NotFound,
            BackendError::Unauthorized(_) => ExitCode::Forbidden,
            BackendError::RequestFailed(_) => ExitCode::NetworkError,
            BackendError::Status { .. } | BackendError::InvalidResponse(_) => ExitCode::Error,
        }
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// artfolio - terminal client for an artist's portfolio
///
/// Run without arguments to launch the interactive TUI.
/// Use subcommands for scripting and content administration.
#[derive(Parser, Debug)]
#[command(
    name = "artfolio",
    version,
    about = "Terminal client for an artist's portfolio",
    long_about = "Browse portfolio categories and works, read the site's text sections, \
                  and administer content (bulk upload, covers, deletes).\n\n\
                  Run without arguments to launch the interactive TUI.\n\
                  Use subcommands for automation and scripting.",
    after_help = "EXAMPLES:\n\
                  artfolio                              Launch interactive TUI\n\
                  artfolio media portraits --json       List works of a category\n\
                  artfolio upload portraits a.jpg b.mp4 Bulk upload (admin)\n\
                  artfolio delete-media <id> --yes      Delete without prompting (admin)"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Display language (ru or en)
    #[arg(long, short = 'l', global = true)]
    pub locale: Option<Locale>,

    /// Subcommand to run (omit for TUI mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if running in CLI mode (has subcommand)
    pub fn is_cli_mode(&self) -> bool {
        self.command.is_some()
    }

    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List portfolio categories
    #[command(visible_alias = "cats")]
    Categories(CategoriesCmd),

    /// List the works of a category (by id or slug)
    #[command(visible_alias = "ls")]
    Media(MediaCmd),

    /// Show the site's text sections
    Sections(SectionsCmd),

    /// Show the session user and capability
    Whoami(WhoamiCmd),

    /// Upload files into a category, one at a time (admin)
    #[command(visible_alias = "up")]
    Upload(UploadCmd),

    /// Use a work as the category cover (admin)
    SetCover(SetCoverCmd),

    /// Delete a work (admin, asks for confirmation)
    DeleteMedia(DeleteCmd),

    /// Delete a category (admin, asks for confirmation)
    DeleteCategory(DeleteCmd),

    /// Manage the config file
    #[command(subcommand)]
    Config(ConfigCmd),
}

impl Command {
    /// Commands that change content and therefore need the admin capability
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Command::Upload(_)
                | Command::SetCover(_)
                | Command::DeleteMedia(_)
                | Command::DeleteCategory(_)
        )
    }
}

#[derive(Args, Debug, Default)]
pub struct CategoriesCmd {}

#[derive(Args, Debug)]
pub struct MediaCmd {
    /// Category id or slug
    pub category: String,
}

#[derive(Args, Debug)]
pub struct SectionsCmd {
    /// Only show the section with this key (e.g. about, prices)
    #[arg(long, short = 'k')]
    pub key: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct WhoamiCmd {}

#[derive(Args, Debug)]
pub struct UploadCmd {
    /// Category id or slug
    pub category: String,

    /// Image or video files
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SetCoverCmd {
    /// Category id or slug
    pub category: String,

    /// Id of the work to use as cover
    pub media_id: String,
}

#[derive(Args, Debug)]
pub struct DeleteCmd {
    /// Id to delete
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Write a config file
    Init(ConfigInitCmd),

    /// Print the effective configuration
    Show,
}

#[derive(Args, Debug)]
pub struct ConfigInitCmd {
    /// Backend base URL
    #[arg(long)]
    pub url: Option<String>,

    /// Public (anon) API key
    #[arg(long)]
    pub anon_key: Option<String>,

    /// Overwrite an existing file
    #[arg(long, short = 'f')]
    pub force: bool,
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// Status OK response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusOk {
    pub status: &'static str,
}

impl Default for StatusOk {
    fn default() -> Self {
        Self { status: "ok" }
    }
}

/// `whoami` response
#[derive(Debug, Serialize, Deserialize)]
pub struct WhoamiResponse {
    pub capability: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data as a JSON envelope
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        let output = JsonOutput::success(data);
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    /// Print one line of human output (JSON mode prints envelopes instead)
    pub fn line(&self, msg: impl std::fmt::Display) {
        if !self.json {
            println!("{}", msg);
        }
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        tracing::error!(code = i32::from(code), "{}", msg);
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Confirmation
// =============================================================================

/// Ask a y/N question on `writer`, read the answer from `reader`.
/// Anything but `y`/`yes` (including EOF) is a no.
pub fn confirm_with(mut reader: impl BufRead, mut writer: impl Write, prompt: &str) -> std::io::Result<bool> {
    write!(writer, "{} [y/N] ", prompt)?;
    writer.flush()?;

    let mut answer = String::new();
    reader.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Interactive confirmation on the terminal
pub fn confirm(prompt: &str) -> std::io::Result<bool> {
    let stdin = std::io::stdin();
    confirm_with(stdin.lock(), std::io::stderr(), prompt)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_args_is_tui_mode() {
        let cli = Cli::parse_from(["artfolio"]);
        assert!(!cli.is_cli_mode());
    }

    #[test]
    fn test_upload_command() {
        let cli = Cli::parse_from(["artfolio", "upload", "portraits", "a.jpg", "b.mp4"]);
        match cli.command {
            Some(Command::Upload(ref cmd)) => {
                assert_eq!(cmd.category, "portraits");
                assert_eq!(cmd.files, vec![PathBuf::from("a.jpg"), PathBuf::from("b.mp4")]);
            }
            _ => panic!("Expected Upload command"),
        }
        assert!(cli.command.as_ref().is_some_and(Command::requires_admin));
    }

    #[test]
    fn test_upload_requires_files() {
        assert!(Cli::try_parse_from(["artfolio", "upload", "portraits"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["artfolio", "--json", "--quiet", "--locale", "ru", "categories"]);
        assert!(cli.json);
        assert!(cli.quiet);
        assert_eq!(cli.locale, Some(Locale::Ru));
        assert!(!cli.command.as_ref().is_some_and(Command::requires_admin));
    }

    #[test]
    fn test_invalid_locale_rejected() {
        assert!(Cli::try_parse_from(["artfolio", "--locale", "de", "categories"]).is_err());
    }

    #[test]
    fn test_delete_yes_flag() {
        let cli = Cli::parse_from(["artfolio", "delete-media", "m1", "--yes"]);
        match cli.command {
            Some(Command::DeleteMedia(cmd)) => {
                assert_eq!(cmd.id, "m1");
                assert!(cmd.yes);
            }
            _ => panic!("Expected DeleteMedia command"),
        }
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::parse_from(["artfolio", "config", "init", "--url", "http://localhost:54321"]);
        match cli.command {
            Some(Command::Config(ConfigCmd::Init(cmd))) => {
                assert_eq!(cmd.url.as_deref(), Some("http://localhost:54321"));
                assert!(!cmd.force);
            }
            _ => panic!("Expected config init"),
        }
    }

    #[test]
    fn test_confirm_with() {
        let mut out = Vec::new();
        assert!(confirm_with("y\n".as_bytes(), &mut out, "Delete?").unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "Delete? [y/N] ");

        assert!(confirm_with("YES\n".as_bytes(), Vec::new(), "Delete?").unwrap());
        assert!(!confirm_with("\n".as_bytes(), Vec::new(), "Delete?").unwrap());
        assert!(!confirm_with("".as_bytes(), Vec::new(), "Delete?").unwrap());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::NetworkError), 3);
        assert_eq!(i32::from(ExitCode::NotFound), 4);
        assert_eq!(i32::from(ExitCode::Forbidden), 5);
        assert_eq!(i32::from(ExitCode::Aborted), 6);
        assert_eq!(ExitCode::from(&BackendError::NotFound), ExitCode::NotFound);
        assert_eq!(ExitCode::from(&BackendError::Unauthorized(401)), ExitCode::Forbidden);
    }
}

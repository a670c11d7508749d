//! External viewer - mpv/VLC for videos, the system opener for images
//!
//! The terminal cannot show pixels, so `o` in the gallery hands the current
//! item to a desktop program.

use std::process::Stdio;
use thiserror::Error;
use tokio::process::{Child, Command};

use crate::config::PlayerPreference;
use crate::models::MediaItem;

impl PlayerPreference {
    /// Get the command name for this player
    pub fn command(&self) -> &'static str {
        match self {
            PlayerPreference::Vlc => {
                #[cfg(target_os = "macos")]
                if std::path::Path::new("/Applications/VLC.app").exists() {
                    return "/Applications/VLC.app/Contents/MacOS/VLC";
                }
                "vlc"
            }
            PlayerPreference::Mpv => "mpv",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerPreference::Vlc => "VLC",
            PlayerPreference::Mpv => "mpv",
        }
    }
}

impl std::fmt::Display for PlayerPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Errors from launching an external viewer
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Program '{0}' not found. Install it first.")]
    NotFound(String),
    #[error("Failed to start viewer: {0}")]
    StartFailed(#[from] std::io::Error),
    #[error("Media item has no URL")]
    MissingUrl,
}

/// Program chosen for one media item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalViewer {
    /// Video player from config
    Player(PlayerPreference),
    /// Platform default handler (`xdg-open`, `open`, `start`)
    SystemOpener,
}

impl ExternalViewer {
    /// Videos go to the configured player, everything else to the system opener
    pub fn for_item(item: &MediaItem, preference: PlayerPreference) -> Self {
        if item.is_video() {
            ExternalViewer::Player(preference)
        } else {
            ExternalViewer::SystemOpener
        }
    }

    pub fn program(&self) -> &'static str {
        match self {
            ExternalViewer::Player(p) => p.command(),
            ExternalViewer::SystemOpener => system_opener(),
        }
    }

    /// Arguments passed after the program name
    pub fn args(&self, url: &str) -> Vec<String> {
        match self {
            ExternalViewer::Player(PlayerPreference::Vlc) => {
                vec![url.to_string(), "--no-video-title-show".to_string()]
            }
            ExternalViewer::Player(PlayerPreference::Mpv) => {
                vec![url.to_string(), "--force-window=immediate".to_string()]
            }
            ExternalViewer::SystemOpener if cfg!(target_os = "windows") => {
                vec!["/C".to_string(), "start".to_string(), String::new(), url.to_string()]
            }
            ExternalViewer::SystemOpener => vec![url.to_string()],
        }
    }

    /// Check if the program is available on the system
    pub async fn is_available(&self) -> bool {
        let cmd = self.program();

        if cmd.starts_with('/') {
            return std::path::Path::new(cmd).exists();
        }

        Command::new("which")
            .arg(cmd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Launch the program on `url` without waiting for it
    pub fn spawn(&self, url: &str) -> Result<Child, PlayerError> {
        if url.trim().is_empty() {
            return Err(PlayerError::MissingUrl);
        }

        let mut cmd = Command::new(self.program());
        cmd.args(self.args(url));
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        tracing::info!(program = self.program(), url, "opening media externally");
        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlayerError::NotFound(self.program().to_string())
            } else {
                PlayerError::StartFailed(e)
            }
        })
    }
}

/// Open a media item with the right external program
pub fn open_external(item: &MediaItem, preference: PlayerPreference) -> Result<Child, PlayerError> {
    ExternalViewer::for_item(item, preference).spawn(&item.image_url)
}

fn system_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "cmd"
    } else {
        "xdg-open"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;

    fn item(kind: MediaKind, url: &str) -> MediaItem {
        MediaItem {
            id: "m1".into(),
            category_id: "c1".into(),
            image_url: url.into(),
            title_ru: None,
            title_en: None,
            description_ru: None,
            description_en: None,
            order_index: 0,
            media_type: kind,
        }
    }

    #[test]
    fn test_player_command() {
        let vlc_cmd = PlayerPreference::Vlc.command();
        assert!(vlc_cmd == "vlc" || vlc_cmd == "/Applications/VLC.app/Contents/MacOS/VLC");
        assert_eq!(PlayerPreference::Mpv.command(), "mpv");
        assert_eq!(PlayerPreference::Vlc.to_string(), "VLC");
    }

    #[test]
    fn test_viewer_dispatch_by_kind() {
        let video = item(MediaKind::Video, "https://cdn.test/v.mp4");
        let image = item(MediaKind::Image, "https://cdn.test/a.jpg");
        assert_eq!(
            ExternalViewer::for_item(&video, PlayerPreference::Vlc),
            ExternalViewer::Player(PlayerPreference::Vlc)
        );
        assert_eq!(
            ExternalViewer::for_item(&image, PlayerPreference::Vlc),
            ExternalViewer::SystemOpener
        );
    }

    #[test]
    fn test_player_args() {
        let args = ExternalViewer::Player(PlayerPreference::Mpv).args("https://cdn.test/v.mp4");
        assert_eq!(args, vec!["https://cdn.test/v.mp4", "--force-window=immediate"]);
    }

    #[test]
    fn test_empty_url_is_rejected() {
        let result = open_external(&item(MediaKind::Image, " "), PlayerPreference::Mpv);
        assert!(matches!(result, Err(PlayerError::MissingUrl)));
    }
}

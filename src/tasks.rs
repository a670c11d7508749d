//! Background work for the TUI
//!
//! The event loop drains [`Action`]s from the app, runs each one here on a
//! tokio task and sends the resulting [`AppEvent`] back over a channel.
//! Errors become strings at this boundary; the app only displays them.

use tokio::sync::mpsc::UnboundedSender;

use crate::api::{AuthClient, BackendClient};
use crate::app::{Action, AppEvent};
use crate::config::PlayerPreference;
use crate::media::open_external;

/// Run one action to completion
pub async fn perform(action: Action, backend: &BackendClient, player: PlayerPreference) -> AppEvent {
    match action {
        Action::LoadCategories => {
            AppEvent::Categories(backend.categories().await.map_err(|e| e.to_string()))
        }
        Action::LoadMedia(ticket) => {
            let result = backend
                .media_for_category(&ticket.category_id)
                .await
                .map_err(|e| e.to_string());
            AppEvent::Media(ticket, result)
        }
        Action::LoadSections => {
            AppEvent::Sections(backend.sections().await.map_err(|e| e.to_string()))
        }
        Action::SaveSection(section) => {
            let result = backend
                .update_section(&section)
                .await
                .map(|()| section)
                .map_err(|e| e.to_string());
            AppEvent::SectionSaved(result)
        }
        Action::DeleteMedia {
            category_id,
            media_id,
        } => {
            let result = backend.delete_media(&media_id).await.map_err(|e| e.to_string());
            AppEvent::MediaDeleted {
                category_id,
                media_id,
                result,
            }
        }
        Action::SetCover {
            category_id,
            image_url,
        } => {
            let result = backend
                .set_category_cover(&category_id, &image_url)
                .await
                .map(|()| image_url)
                .map_err(|e| e.to_string());
            AppEvent::CoverSet {
                category_id,
                result,
            }
        }
        Action::OpenExternal(item) => match open_external(&item, player) {
            Ok(_child) => AppEvent::Notice(format!("Opened {}", item.image_url)),
            Err(e) => AppEvent::Notice(format!("Could not open: {}", e)),
        },
    }
}

/// Resolve the session capability; failures mean visitor
pub async fn resolve_capability(backend: &BackendClient) -> AppEvent {
    AppEvent::Capability(AuthClient::new(backend).capability_or_visitor().await)
}

/// Spawn `action` and forward its event to `tx`
pub fn spawn(action: Action, backend: BackendClient, player: PlayerPreference, tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let event = perform(action, &backend, player).await;
        // Receiver gone means the UI has shut down
        let _ = tx.send(event);
    });
}

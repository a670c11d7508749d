//! CLI Command Handlers
//!
//! Implements all CLI commands by calling the backend. Each handler takes
//! its CLI args, the shared [`CommandContext`] and the [`Output`], and
//! returns an [`ExitCode`]. Admin commands are gated in [`dispatch`] before
//! any content request is made.

use std::path::Path;

use crate::access::Capability;
use crate::api::{AuthClient, AuthError, BackendClient, BackendError};
use crate::cli::{
    CategoriesCmd, Command, ConfigCmd, ConfigInitCmd, DeleteCmd, ExitCode, MediaCmd, Output,
    SectionsCmd, SetCoverCmd, StatusOk, UploadCmd, WhoamiCmd, WhoamiResponse,
};
use crate::config::Config;
use crate::media::{BulkUploader, UploadFile};
use crate::models::{Category, Locale, MediaItem};
use crate::ui::picker::{COVER_GLYPH, PLACEHOLDER_GLYPH};

/// Everything a handler needs
pub struct CommandContext {
    pub config: Config,
    pub backend: BackendClient,
    pub capability: Capability,
}

impl CommandContext {
    /// Build the backend client and resolve the session capability.
    /// Lookup failures degrade to visitor.
    pub async fn resolve(config: Config) -> anyhow::Result<Self> {
        let backend = BackendClient::from_config(&config)?;
        let capability = AuthClient::new(&backend).capability_or_visitor().await;
        Ok(Self {
            config,
            backend,
            capability,
        })
    }

    pub fn locale(&self) -> Locale {
        self.config.locale
    }
}

/// Run a content command. `confirm` answers y/N prompts for deletes.
pub async fn dispatch(
    command: Command,
    ctx: &CommandContext,
    output: &Output,
    confirm: impl FnOnce(&str) -> bool,
) -> ExitCode {
    if command.requires_admin() && !ctx.capability.is_admin() {
        return output.error(
            "This command needs an admin session (set ARTFOLIO_ACCESS_TOKEN)",
            ExitCode::Forbidden,
        );
    }

    match command {
        Command::Categories(cmd) => categories_cmd(cmd, ctx, output).await,
        Command::Media(cmd) => media_cmd(cmd, ctx, output).await,
        Command::Sections(cmd) => sections_cmd(cmd, ctx, output).await,
        Command::Whoami(cmd) => whoami_cmd(cmd, ctx, output).await,
        Command::Upload(cmd) => upload_cmd(cmd, ctx, output).await,
        Command::SetCover(cmd) => set_cover_cmd(cmd, ctx, output).await,
        Command::DeleteMedia(cmd) => delete_media_cmd(cmd, ctx, output, confirm).await,
        Command::DeleteCategory(cmd) => delete_category_cmd(cmd, ctx, output, confirm).await,
        Command::Config(cmd) => config_cmd(cmd, None, &ctx.config, output),
    }
}

fn backend_error(output: &Output, context: &str, err: &BackendError) -> ExitCode {
    output.error(format!("{}: {}", context, err), ExitCode::from(err))
}

fn print_or_fail<T: serde::Serialize>(output: &Output, data: T) -> ExitCode {
    match output.print(data) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
    }
}

/// Find a category by id or slug
pub async fn resolve_category(backend: &BackendClient, key: &str) -> Result<Category, BackendError> {
    backend
        .categories()
        .await?
        .into_iter()
        .find(|c| c.id == key || c.slug == key)
        .ok_or(BackendError::NotFound)
}

// =============================================================================
// Read Commands
// =============================================================================

pub async fn categories_cmd(_cmd: CategoriesCmd, ctx: &CommandContext, output: &Output) -> ExitCode {
    let categories = match ctx.backend.categories().await {
        Ok(categories) => categories,
        Err(e) => return backend_error(output, "Loading categories failed", &e),
    };

    if output.json {
        return print_or_fail(output, &categories);
    }
    if categories.is_empty() {
        output.info("No categories yet");
    }
    for category in &categories {
        let glyph = if category.has_cover() {
            COVER_GLYPH
        } else {
            PLACEHOLDER_GLYPH
        };
        output.line(format!(
            "{:>3}  {} {}  /{}  ({})",
            category.order_index,
            glyph,
            category.name(ctx.locale()),
            category.slug,
            category.id
        ));
    }
    ExitCode::Success
}

pub async fn media_cmd(cmd: MediaCmd, ctx: &CommandContext, output: &Output) -> ExitCode {
    let category = match resolve_category(&ctx.backend, &cmd.category).await {
        Ok(category) => category,
        Err(BackendError::NotFound) => {
            return output.error(format!("Category not found: {}", cmd.category), ExitCode::NotFound)
        }
        Err(e) => return backend_error(output, "Loading categories failed", &e),
    };

    let items = match ctx.backend.media_for_category(&category.id).await {
        Ok(items) => items,
        Err(e) => return backend_error(output, "Loading works failed", &e),
    };

    if output.json {
        return print_or_fail(output, &items);
    }
    output.info(format!("{} ({} works)", category.name(ctx.locale()), items.len()));
    for item in &items {
        output.line(media_line(item, ctx.locale()));
    }
    ExitCode::Success
}

fn media_line(item: &MediaItem, locale: Locale) -> String {
    let title = item.title();
    format!(
        "{:>3}  [{}] {}  {}  ({})",
        item.order_index,
        item.media_type,
        title.get(locale).unwrap_or("untitled"),
        item.image_url,
        item.id
    )
}

pub async fn sections_cmd(cmd: SectionsCmd, ctx: &CommandContext, output: &Output) -> ExitCode {
    let mut sections = match ctx.backend.sections().await {
        Ok(sections) => sections,
        Err(e) => return backend_error(output, "Loading sections failed", &e),
    };

    if let Some(ref key) = cmd.key {
        sections.retain(|s| &s.key == key);
        if sections.is_empty() {
            return output.error(format!("Section not found: {}", key), ExitCode::NotFound);
        }
    }

    if output.json {
        return print_or_fail(output, &sections);
    }
    for section in &sections {
        output.line(format!("## {}", section.display_name()));
        if let Some(title) = section.title().get(ctx.locale()) {
            output.line(title);
        }
        if let Some(description) = section.description().get(ctx.locale()) {
            output.line(description);
        }
        output.line("");
    }
    ExitCode::Success
}

pub async fn whoami_cmd(_cmd: WhoamiCmd, ctx: &CommandContext, output: &Output) -> ExitCode {
    let user = match AuthClient::new(&ctx.backend).session_user().await {
        Ok(user) => Some(user),
        Err(AuthError::NoSession) => None,
        Err(AuthError::InvalidSession) => {
            return output.error("Session expired or invalid", ExitCode::Forbidden)
        }
        Err(e) => return output.error(format!("Session lookup failed: {}", e), ExitCode::NetworkError),
    };

    let response = WhoamiResponse {
        capability: ctx.capability.to_string(),
        user_id: user.as_ref().map(|u| u.id.clone()),
        email: user.and_then(|u| u.email),
    };

    if output.json {
        return print_or_fail(output, &response);
    }
    match (&response.user_id, &response.email) {
        (Some(id), Some(email)) => output.line(format!("{} <{}> ({})", id, email, response.capability)),
        (Some(id), None) => output.line(format!("{} ({})", id, response.capability)),
        _ => output.line(format!("anonymous ({})", response.capability)),
    }
    ExitCode::Success
}

// =============================================================================
// Admin Commands
// =============================================================================

pub async fn upload_cmd(cmd: UploadCmd, ctx: &CommandContext, output: &Output) -> ExitCode {
    let category = match resolve_category(&ctx.backend, &cmd.category).await {
        Ok(category) => category,
        Err(BackendError::NotFound) => {
            return output.error(format!("Category not found: {}", cmd.category), ExitCode::NotFound)
        }
        Err(e) => return backend_error(output, "Loading categories failed", &e),
    };

    // New works go after the existing ones
    let max_order_index = match ctx.backend.media_for_category(&category.id).await {
        Ok(items) => items.iter().map(|m| m.order_index).max().unwrap_or(-1),
        Err(e) => return backend_error(output, "Loading works failed", &e),
    };

    let files: Vec<UploadFile> = cmd.files.into_iter().map(UploadFile::from).collect();
    let uploader = BulkUploader::new(&ctx.backend, category.id.clone(), max_order_index);
    let summary = uploader
        .run(files, |progress| output.info(format!("Uploading {}...", progress)))
        .await;

    if output.json {
        if let Err(e) = output.print(&summary) {
            return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
        }
    } else {
        for error in &summary.errors {
            output.info(format!("  ✗ {}", error));
        }
        output.line(&summary);
    }

    if summary.failed > 0 {
        return output.error(
            format!("{} of {} files failed", summary.failed, summary.total()),
            ExitCode::Error,
        );
    }
    ExitCode::Success
}

pub async fn set_cover_cmd(cmd: SetCoverCmd, ctx: &CommandContext, output: &Output) -> ExitCode {
    let category = match resolve_category(&ctx.backend, &cmd.category).await {
        Ok(category) => category,
        Err(BackendError::NotFound) => {
            return output.error(format!("Category not found: {}", cmd.category), ExitCode::NotFound)
        }
        Err(e) => return backend_error(output, "Loading categories failed", &e),
    };

    let item = match ctx.backend.media_item(&cmd.media_id).await {
        Ok(item) => item,
        Err(BackendError::NotFound) => {
            return output.error(format!("Work not found: {}", cmd.media_id), ExitCode::NotFound)
        }
        Err(e) => return backend_error(output, "Loading work failed", &e),
    };

    if item.category_id != category.id {
        return output.error(
            format!("Work {} does not belong to {}", item.id, category.slug),
            ExitCode::InvalidArgs,
        );
    }

    if let Err(e) = ctx.backend.set_category_cover(&category.id, &item.image_url).await {
        return backend_error(output, "Setting cover failed", &e);
    }
    tracing::info!(category = %category.id, media = %item.id, "cover updated");

    if output.json {
        return print_or_fail(output, StatusOk::default());
    }
    output.line(format!("Cover of {} set to {}", category.name(ctx.locale()), item.image_url));
    ExitCode::Success
}

pub async fn delete_media_cmd(
    cmd: DeleteCmd,
    ctx: &CommandContext,
    output: &Output,
    confirm: impl FnOnce(&str) -> bool,
) -> ExitCode {
    if !cmd.yes && !confirm(&format!("Delete work {}?", cmd.id)) {
        return output.error("Aborted", ExitCode::Aborted);
    }

    match ctx.backend.delete_media(&cmd.id).await {
        Ok(()) => {
            tracing::info!(media = %cmd.id, "work deleted");
            if output.json {
                return print_or_fail(output, StatusOk::default());
            }
            output.line(format!("Deleted work {}", cmd.id));
            ExitCode::Success
        }
        Err(e) => backend_error(output, "Delete failed", &e),
    }
}

pub async fn delete_category_cmd(
    cmd: DeleteCmd,
    ctx: &CommandContext,
    output: &Output,
    confirm: impl FnOnce(&str) -> bool,
) -> ExitCode {
    if !cmd.yes && !confirm(&format!("Delete category {} and its works?", cmd.id)) {
        return output.error("Aborted", ExitCode::Aborted);
    }

    match ctx.backend.delete_category(&cmd.id).await {
        Ok(()) => {
            tracing::info!(category = %cmd.id, "category deleted");
            if output.json {
                return print_or_fail(output, StatusOk::default());
            }
            output.line(format!("Deleted category {}", cmd.id));
            ExitCode::Success
        }
        Err(e) => backend_error(output, "Delete failed", &e),
    }
}

// =============================================================================
// Config Command
// =============================================================================

/// `config init|show`; runs without a backend. `path` overrides the
/// default config location for `init`.
pub fn config_cmd(cmd: ConfigCmd, path: Option<&Path>, config: &Config, output: &Output) -> ExitCode {
    match cmd {
        ConfigCmd::Init(init) => config_init(init, path, output),
        ConfigCmd::Show => {
            let mut shown = config.clone();
            if shown.access_token.is_some() {
                shown.access_token = Some("********".into());
            }
            if output.json {
                return print_or_fail(output, &shown);
            }
            match toml::to_string_pretty(&shown) {
                Ok(text) => {
                    output.line(text.trim_end());
                    ExitCode::Success
                }
                Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
            }
        }
    }
}

fn config_init(cmd: ConfigInitCmd, path: Option<&Path>, output: &Output) -> ExitCode {
    let Some(path) = path.map(Path::to_path_buf).or_else(Config::path) else {
        return output.error("Could not determine config path", ExitCode::Error);
    };

    if path.exists() && !cmd.force {
        return output.error(
            format!("{} already exists (use --force to overwrite)", path.display()),
            ExitCode::InvalidArgs,
        );
    }

    let config = Config {
        backend_url: cmd.url,
        anon_key: cmd.anon_key,
        ..Config::default()
    };
    if let Err(e) = config.save_to(&path) {
        return output.error(format!("Writing config failed: {}", e), ExitCode::Error);
    }

    output.info(format!("Wrote {}", path.display()));
    if output.json {
        return print_or_fail(output, StatusOk::default());
    }
    ExitCode::Success
}

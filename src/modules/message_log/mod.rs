pub mod events;

use crate::Error;
use crate::modules::{Module, ModuleDefinition};
use crate::services::log_channels::LogChannel;
use crate::services::notification::{Notification, Tone};
use crate::services::notifier::LogContext;
use crate::snapshot::{MessageSnapshot, UserSnapshot};
use fluent::FluentArgs;

/// Embed field values are capped at 1024 characters.
pub const MAX_LOGGED_CONTENT: usize = 1024;

pub fn module() -> Module {
    Module {
        definition: ModuleDefinition {
            id: "message_log",
            name_key: "module-message-log-name",
            description_key: "module-message-log-desc",
            log_channel: LogChannel::MessageLog,
        },
        event_handlers: vec![events::handler],
    }
}

/// Passes content through unless it is longer than an embed field allows.
pub fn clamp_content<'a>(content: &'a str, placeholder: &'a str) -> &'a str {
    if content.chars().count() > MAX_LOGGED_CONTENT {
        placeholder
    } else {
        content
    }
}

fn content_value(log: &LogContext<'_>, content: Option<&str>, too_long_key: &str) -> String {
    match content {
        None | Some("") => log.t("log-no-content"),
        Some(content) => clamp_content(content, &log.t(too_long_key)).to_string(),
    }
}

fn is_loggable(message: &MessageSnapshot) -> bool {
    message.guild_id.is_some() && !message.author.as_ref().is_some_and(|author| author.bot)
}

fn message_notification(
    log: &LogContext<'_>,
    tone: Tone,
    title_key: &str,
    desc_key: &str,
    message: &MessageSnapshot,
    author: Option<&UserSnapshot>,
) -> Notification {
    let mut args = FluentArgs::new();
    args.set("channelId", message.channel_id.get().to_string());

    let user = author
        .map(UserSnapshot::mention)
        .unwrap_or_else(|| log.t("log-unknown-user"));

    Notification::new(tone, log.t(title_key))
        .description(log.l10n.t(desc_key, Some(&args)))
        .field(log.t("log-field-user"), user, true)
        .field(log.t("log-field-message-id"), message.id.to_string(), true)
        .footer(
            log.t("log-footer-message"),
            author.map(|author| author.avatar_url.clone()),
        )
}

pub async fn handle_sent(log: &LogContext<'_>, message: &MessageSnapshot) -> Result<(), Error> {
    if !is_loggable(message) {
        return Ok(());
    }

    let notification = message_notification(
        log,
        Tone::Blue,
        "log-msg-sent-title",
        "log-msg-sent-desc",
        message,
        message.author.as_ref(),
    )
    .field(
        log.t("log-msg-field-content"),
        content_value(log, message.content.as_deref(), "log-msg-too-long"),
        false,
    );

    log.send(LogChannel::MessageLog, notification).await?;
    Ok(())
}

/// `old` is whatever was known about the message before the edit; edits of
/// messages sent before this session have no previous content.
pub async fn handle_edit(
    log: &LogContext<'_>,
    old: Option<&MessageSnapshot>,
    new: &MessageSnapshot,
) -> Result<(), Error> {
    let Some(new_content) = new.content.as_deref() else {
        return Ok(());
    };
    let old_content = old.and_then(|message| message.content.as_deref());
    if old_content == Some(new_content) {
        return Ok(());
    }

    let author = new
        .author
        .as_ref()
        .or_else(|| old.and_then(|message| message.author.as_ref()));
    if new.guild_id.is_none() || author.is_some_and(|author| author.bot) {
        return Ok(());
    }

    let notification = message_notification(
        log,
        Tone::Orange,
        "log-msg-edit-title",
        "log-msg-edit-desc",
        new,
        author,
    )
    .field(
        log.t("log-msg-field-before"),
        content_value(log, old_content, "log-msg-before-too-long"),
        false,
    )
    .field(
        log.t("log-msg-field-after"),
        content_value(log, Some(new_content), "log-msg-after-too-long"),
        false,
    );

    log.send(LogChannel::MessageLog, notification).await?;
    Ok(())
}

pub async fn handle_delete(log: &LogContext<'_>, message: &MessageSnapshot) -> Result<(), Error> {
    if !is_loggable(message) {
        return Ok(());
    }

    let notification = message_notification(
        log,
        Tone::Red,
        "log-msg-delete-title",
        "log-msg-delete-desc",
        message,
        message.author.as_ref(),
    )
    .field(
        log.t("log-msg-field-content"),
        content_value(log, message.content.as_deref(), "log-msg-deleted-too-long"),
        false,
    );

    log.send(LogChannel::MessageLog, notification).await?;
    Ok(())
}

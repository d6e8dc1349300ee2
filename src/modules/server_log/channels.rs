use super::{change, line, server_notification};
use crate::Error;
use crate::services::log_channels::LogChannel;
use crate::services::notification::Tone;
use crate::services::notifier::LogContext;
use crate::snapshot::ChannelSnapshot;
use poise::serenity_prelude as serenity;

pub fn channel_kind_key(kind: serenity::ChannelType) -> &'static str {
    match kind {
        serenity::ChannelType::Text => "log-channel-kind-text",
        serenity::ChannelType::Voice => "log-channel-kind-voice",
        serenity::ChannelType::Category => "log-channel-kind-category",
        serenity::ChannelType::News => "log-channel-kind-news",
        serenity::ChannelType::PublicThread => "log-channel-kind-thread-public",
        serenity::ChannelType::PrivateThread => "log-channel-kind-thread-private",
        serenity::ChannelType::NewsThread => "log-channel-kind-thread-news",
        serenity::ChannelType::Stage => "log-channel-kind-stage",
        serenity::ChannelType::Forum => "log-channel-kind-forum",
        _ => "log-channel-kind-unknown",
    }
}

fn yes_no(log: &LogContext<'_>, value: bool) -> String {
    log.t(if value { "log-yes" } else { "log-no" })
}

fn parent_label(log: &LogContext<'_>, parent: Option<serenity::ChannelId>) -> String {
    parent
        .map(|id| format!("<#{}>", id.get()))
        .unwrap_or_else(|| log.t("log-none"))
}

/// Change lines for the tracked channel fields, empty when none changed.
pub fn channel_changes(
    log: &LogContext<'_>,
    old: &ChannelSnapshot,
    new: &ChannelSnapshot,
) -> Vec<String> {
    let mut changes = vec![];

    if old.name != new.name {
        changes.push(change(log, "log-change-name", old.name.clone(), new.name.clone()));
    }
    if old.topic != new.topic {
        let topic = |topic: &Option<String>| {
            topic
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| log.t("log-none"))
        };
        changes.push(change(log, "log-change-topic", topic(&old.topic), topic(&new.topic)));
    }
    if old.parent_id != new.parent_id {
        changes.push(change(
            log,
            "log-change-category",
            parent_label(log, old.parent_id),
            parent_label(log, new.parent_id),
        ));
    }
    if old.nsfw != new.nsfw {
        changes.push(change(
            log,
            "log-change-nsfw",
            yes_no(log, old.nsfw),
            yes_no(log, new.nsfw),
        ));
    }
    if old.slowmode.unwrap_or(0) != new.slowmode.unwrap_or(0) {
        changes.push(change(
            log,
            "log-change-slowmode",
            old.slowmode.unwrap_or(0).to_string(),
            new.slowmode.unwrap_or(0).to_string(),
        ));
    }

    changes
}

pub async fn handle_channel_create(
    log: &LogContext<'_>,
    channel: &ChannelSnapshot,
) -> Result<(), Error> {
    let lines = [
        line(log, "log-line-name", &[("name", channel.name.clone())]),
        line(log, "log-line-type", &[("kind", log.t(channel_kind_key(channel.kind)))]),
    ];
    log.send(
        LogChannel::ServerLog,
        server_notification(log, Tone::Green, "log-channel-create-title", &lines),
    )
    .await?;
    Ok(())
}

pub async fn handle_channel_update(
    log: &LogContext<'_>,
    old: Option<&ChannelSnapshot>,
    new: &ChannelSnapshot,
) -> Result<(), Error> {
    let Some(old) = old else {
        return Ok(());
    };
    let changes = channel_changes(log, old, new);
    if changes.is_empty() {
        return Ok(());
    }

    log.send(
        LogChannel::ServerLog,
        server_notification(log, Tone::Orange, "log-channel-update-title", &changes),
    )
    .await?;
    Ok(())
}

pub async fn handle_channel_delete(
    log: &LogContext<'_>,
    channel: &ChannelSnapshot,
) -> Result<(), Error> {
    let lines = [line(log, "log-line-name", &[("name", channel.name.clone())])];
    log.send(
        LogChannel::ServerLog,
        server_notification(log, Tone::Red, "log-channel-delete-title", &lines),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::audit::testing::FakeAudit;
    use crate::services::notifier::testing::{RecordingNotifier, log_context};

    fn channel(name: &str) -> ChannelSnapshot {
        ChannelSnapshot {
            name: name.to_string(),
            kind: serenity::ChannelType::Text,
            topic: None,
            parent_id: None,
            nsfw: false,
            slowmode: None,
        }
    }

    #[tokio::test]
    async fn test_create_shows_readable_type() {
        let notifier = RecordingNotifier::all();
        let audit = FakeAudit::default();
        let log = log_context(&notifier, &audit);

        let mut forum = channel("ideas");
        forum.kind = serenity::ChannelType::Forum;
        handle_channel_create(&log, &forum).await.unwrap();

        let sent = notifier.sent();
        assert_eq!(sent[0].0, LogChannel::ServerLog);
        assert_eq!(
            sent[0].1.description.as_deref(),
            Some("**Name:** ideas\n**Type:** Forum Channel")
        );
        assert_eq!(
            sent[0].1.footer.as_ref().map(|f| f.text.as_str()),
            Some("Server Log")
        );
    }

    #[tokio::test]
    async fn test_update_lists_only_changed_fields() {
        let notifier = RecordingNotifier::all();
        let audit = FakeAudit::default();
        let log = log_context(&notifier, &audit);

        let old = channel("general");
        let mut new = channel("chat");
        new.slowmode = Some(10);
        handle_channel_update(&log, Some(&old), &new).await.unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].1.description.as_deref(),
            Some("**Name:** `general` → `chat`\n**Slowmode:** 0s → 10s")
        );
    }

    #[tokio::test]
    async fn test_update_without_tracked_change_or_old_state_is_silent() {
        let notifier = RecordingNotifier::all();
        let audit = FakeAudit::default();
        let log = log_context(&notifier, &audit);

        let old = channel("general");
        let mut new = channel("general");
        new.slowmode = Some(0);
        handle_channel_update(&log, Some(&old), &new).await.unwrap();
        handle_channel_update(&log, None, &channel("renamed")).await.unwrap();

        assert!(notifier.sent().is_empty());
    }
}

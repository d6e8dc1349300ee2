use crate::modules::{Module, ModuleDefinition};
use crate::services::log_channels::LogChannel;
use crate::services::notification::{Notification, Tone};
use crate::services::notifier::LogContext;
use crate::snapshot::{ChannelRef, VoiceSnapshot};
use crate::{Data, Error};
use poise::serenity_prelude as serenity;

pub fn module() -> Module {
    Module {
        definition: ModuleDefinition {
            id: "voice_log",
            name_key: "module-voice-log-name",
            description_key: "module-voice-log-desc",
            log_channel: LogChannel::VoiceLog,
        },
        event_handlers: vec![handler],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceAction {
    Joined,
    Left,
    Moved,
}

/// Mute, deafen and stream toggles keep the channel and classify as `None`.
pub fn classify(
    old: Option<serenity::ChannelId>,
    new: Option<serenity::ChannelId>,
) -> Option<VoiceAction> {
    match (old, new) {
        (None, Some(_)) => Some(VoiceAction::Joined),
        (Some(_), None) => Some(VoiceAction::Left),
        (Some(old), Some(new)) if old != new => Some(VoiceAction::Moved),
        _ => None,
    }
}

fn channel_label(channel: Option<&ChannelRef>) -> String {
    channel.map(ChannelRef::label).unwrap_or_default()
}

pub async fn handle_voice_update(
    log: &LogContext<'_>,
    old: Option<&VoiceSnapshot>,
    new: &VoiceSnapshot,
) -> Result<(), Error> {
    let old_channel = old.and_then(|state| state.channel.as_ref());
    let Some(action) = classify(
        old_channel.map(|channel| channel.id),
        new.channel.as_ref().map(|channel| channel.id),
    ) else {
        return Ok(());
    };

    let (tone, desc_key, channel) = match action {
        VoiceAction::Joined => (Tone::Green, "log-voice-joined", channel_label(new.channel.as_ref())),
        VoiceAction::Left => (Tone::Red, "log-voice-left", channel_label(old_channel)),
        VoiceAction::Moved => (
            Tone::Blue,
            "log-voice-moved",
            format!(
                "{} ➜ {}",
                channel_label(old_channel),
                channel_label(new.channel.as_ref())
            ),
        ),
    };

    let user = new
        .user
        .as_ref()
        .or_else(|| old.and_then(|state| state.user.as_ref()));
    let tag = user
        .map(|user| user.tag.clone())
        .unwrap_or_else(|| log.t("log-unknown-user"));

    let notification = Notification::new(tone, log.t("log-voice-title"))
        .description(log.l10n.t_user(desc_key, &tag))
        .field(log.t("log-field-user"), format!("<@{}>", new.user_id.get()), true)
        .field(log.t("log-field-channel"), channel, true)
        .field(log.t("log-field-user-id"), new.user_id.to_string(), true);

    log.send(
        LogChannel::VoiceLog,
        log.guild_footer(notification, "log-footer-voice"),
    )
    .await?;
    Ok(())
}

pub fn handler<'a>(
    ctx: &'a serenity::Context,
    event: &'a serenity::FullEvent,
    data: &'a Data,
) -> poise::BoxFuture<'a, Result<(), Error>> {
    Box::pin(async move {
        if let serenity::FullEvent::VoiceStateUpdate { old, new, .. } = event {
            let Some(guild_id) = new.guild_id else {
                return Ok(());
            };
            let old = old
                .as_ref()
                .map(|state| VoiceSnapshot::from_state(state, &ctx.cache));
            let new = VoiceSnapshot::from_state(new, &ctx.cache);

            let log = LogContext::new(ctx, data, guild_id);
            handle_voice_update(&log, old.as_ref(), &new).await?;
        }
        Ok(())
    })
}

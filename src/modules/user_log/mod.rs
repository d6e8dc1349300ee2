use crate::modules::{Module, ModuleDefinition};
use crate::services::log_channels::LogChannel;
use crate::services::notification::{Notification, Tone};
use crate::services::notifier::LogContext;
use crate::snapshot::UserSnapshot;
use crate::{Data, Error};
use poise::serenity_prelude as serenity;

pub fn module() -> Module {
    Module {
        definition: ModuleDefinition {
            id: "user_log",
            name_key: "module-user-log-name",
            description_key: "module-user-log-desc",
            log_channel: LogChannel::UserLog,
        },
        event_handlers: vec![handler],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Joined,
    /// Any removal: leaves, kicks and bans alike.
    Left,
}

pub fn membership_notification(
    log: &LogContext<'_>,
    user: &UserSnapshot,
    membership: Membership,
) -> Notification {
    let (tone, title_key, desc_key) = match membership {
        Membership::Joined => (Tone::Green, "log-user-joined-title", "log-user-joined-desc"),
        Membership::Left => (Tone::Red, "log-user-left-title", "log-user-left-desc"),
    };

    Notification::new(tone, log.t(title_key))
        .description(log.l10n.t_user(desc_key, &user.tag))
        .field(log.t("log-field-user"), user.mention(), true)
        .field(log.t("log-field-user-id"), user.id.to_string(), true)
        .field(
            log.t("log-user-created"),
            format!("<t:{}:R>", user.created_at),
            true,
        )
        .thumbnail(user.avatar_url.clone())
        .footer(log.t("log-footer-user"), Some(user.avatar_url.clone()))
}

pub async fn handle_membership(
    log: &LogContext<'_>,
    user: &UserSnapshot,
    membership: Membership,
) -> Result<(), Error> {
    log.send(
        LogChannel::UserLog,
        membership_notification(log, user, membership),
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
        match event {
            serenity::FullEvent::GuildMemberAddition { new_member, .. } => {
                let log = LogContext::new(ctx, data, new_member.guild_id);
                let user = UserSnapshot::from(&new_member.user);
                handle_membership(&log, &user, Membership::Joined).await?;
            }
            serenity::FullEvent::GuildMemberRemoval { guild_id, user, .. } => {
                let log = LogContext::new(ctx, data, *guild_id);
                handle_membership(&log, &UserSnapshot::from(user), Membership::Left).await?;
            }
            _ => {}
        }
        Ok(())
    })
}

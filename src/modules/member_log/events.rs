use super::{changes, moderation};
use crate::services::notifier::LogContext;
use crate::snapshot::{MemberSnapshot, UserSnapshot};
use crate::{Data, Error};
use chrono::Utc;
use poise::serenity_prelude as serenity;
use tracing::debug;

pub fn handler<'a>(
    ctx: &'a serenity::Context,
    event: &'a serenity::FullEvent,
    data: &'a Data,
) -> poise::BoxFuture<'a, Result<(), Error>> {
    Box::pin(async move {
        match event {
            serenity::FullEvent::GuildMemberUpdate {
                old_if_available,
                new,
                event,
                ..
            } => {
                let Some(old) = old_if_available.as_ref().map(MemberSnapshot::from) else {
                    debug!(
                        "Member {} not cached in guild {}, skipping diff",
                        event.user.id, event.guild_id
                    );
                    return Ok(());
                };
                let new = new
                    .as_ref()
                    .map(MemberSnapshot::from)
                    .unwrap_or_else(|| MemberSnapshot::from(event));

                let log = LogContext::new(ctx, data, event.guild_id);
                changes::handle_member_update(&log, &old, &new).await?;
            }
            serenity::FullEvent::GuildBanAddition {
                guild_id,
                banned_user,
                ..
            } => {
                let log = LogContext::new(ctx, data, *guild_id);
                let user = UserSnapshot::from(banned_user);
                moderation::handle_ban(&log, &user, Utc::now().timestamp()).await?;
            }
            serenity::FullEvent::GuildBanRemoval {
                guild_id,
                unbanned_user,
                ..
            } => {
                let log = LogContext::new(ctx, data, *guild_id);
                moderation::handle_unban(&log, &UserSnapshot::from(unbanned_user)).await?;
            }
            serenity::FullEvent::GuildMemberRemoval { guild_id, user, .. } => {
                let log = LogContext::new(ctx, data, *guild_id);
                let user = UserSnapshot::from(user);
                moderation::handle_kick(&log, &user, Utc::now().timestamp()).await?;
            }
            _ => {}
        }
        Ok(())
    })
}

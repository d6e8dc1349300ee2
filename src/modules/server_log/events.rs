use super::{channels, emojis, guild, roles};
use crate::services::notifier::LogContext;
use crate::snapshot::{ChannelSnapshot, EmojiSnapshot, RoleSnapshot};
use crate::{Data, Error};
use poise::serenity_prelude as serenity;

pub fn handler<'a>(
    ctx: &'a serenity::Context,
    event: &'a serenity::FullEvent,
    data: &'a Data,
) -> poise::BoxFuture<'a, Result<(), Error>> {
    Box::pin(async move {
        match event {
            serenity::FullEvent::ChannelCreate { channel, .. }
            | serenity::FullEvent::CategoryCreate {
                category: channel, ..
            } => {
                let log = LogContext::new(ctx, data, channel.guild_id);
                channels::handle_channel_create(&log, &ChannelSnapshot::from(channel)).await?;
            }
            serenity::FullEvent::ChannelUpdate { old, new, .. } => {
                let log = LogContext::new(ctx, data, new.guild_id);
                let old = old.as_ref().map(ChannelSnapshot::from);
                channels::handle_channel_update(&log, old.as_ref(), &ChannelSnapshot::from(new))
                    .await?;
            }
            serenity::FullEvent::ChannelDelete { channel, .. }
            | serenity::FullEvent::CategoryDelete {
                category: channel, ..
            } => {
                let log = LogContext::new(ctx, data, channel.guild_id);
                channels::handle_channel_delete(&log, &ChannelSnapshot::from(channel)).await?;
            }
            serenity::FullEvent::GuildRoleCreate { new, .. } => {
                let log = LogContext::new(ctx, data, new.guild_id);
                roles::handle_role_create(&log, &RoleSnapshot::from(new)).await?;
            }
            serenity::FullEvent::GuildRoleUpdate {
                old_data_if_available,
                new,
                ..
            } => {
                let old = old_data_if_available.as_ref().map(RoleSnapshot::from);
                let log = LogContext::new(ctx, data, new.guild_id);
                roles::handle_role_update(&log, old.as_ref(), &RoleSnapshot::from(new)).await?;
            }
            serenity::FullEvent::GuildRoleDelete {
                guild_id,
                removed_role_id,
                removed_role_data_if_available,
                ..
            } => {
                let name = removed_role_data_if_available
                    .as_ref()
                    .map(|role| role.name.clone())
                    .unwrap_or_else(|| removed_role_id.to_string());
                let log = LogContext::new(ctx, data, *guild_id);
                roles::handle_role_delete(&log, &name).await?;
            }
            serenity::FullEvent::GuildUpdate {
                old_data_if_available,
                new_data,
                ..
            } => {
                let old_name = old_data_if_available.as_ref().map(|old| old.name.clone());
                let log = LogContext::new(ctx, data, new_data.id);
                guild::handle_guild_update(&log, old_name.as_deref(), &new_data.name).await?;
            }
            serenity::FullEvent::GuildEmojisUpdate {
                guild_id,
                current_state,
                ..
            } => {
                let mut current: Vec<EmojiSnapshot> =
                    current_state.values().map(EmojiSnapshot::from).collect();
                current.sort_by_key(|emoji| emoji.id);
                let previous = data.cache.replace_emojis(*guild_id, current.clone());

                let log = LogContext::new(ctx, data, *guild_id);
                emojis::handle_emojis_update(&log, previous.as_deref(), &current).await?;
            }
            _ => {}
        }
        Ok(())
    })
}

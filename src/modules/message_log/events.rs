use crate::services::notifier::LogContext;
use crate::snapshot::MessageSnapshot;
use crate::{Data, Error};
use poise::serenity_prelude as serenity;

pub fn handler<'a>(
    ctx: &'a serenity::Context,
    event: &'a serenity::FullEvent,
    data: &'a Data,
) -> poise::BoxFuture<'a, Result<(), Error>> {
    Box::pin(async move {
        match event {
            serenity::FullEvent::Message { new_message, .. } => {
                let Some(guild_id) = new_message.guild_id else {
                    return Ok(());
                };
                let message = MessageSnapshot::from(new_message);
                if !new_message.author.bot {
                    data.cache.store_message(message.clone());
                }

                let log = LogContext::new(ctx, data, guild_id);
                super::handle_sent(&log, &message).await?;
            }
            serenity::FullEvent::MessageUpdate {
                old_if_available,
                event,
                ..
            } => {
                let Some(guild_id) = event.guild_id else {
                    return Ok(());
                };
                let tracked = event
                    .content
                    .as_deref()
                    .and_then(|content| data.cache.update_message(event.id, content));
                let old = old_if_available
                    .as_ref()
                    .map(MessageSnapshot::from)
                    .or(tracked);
                let new = MessageSnapshot::from(event);

                let log = LogContext::new(ctx, data, guild_id);
                super::handle_edit(&log, old.as_ref(), &new).await?;
            }
            serenity::FullEvent::MessageDelete {
                channel_id,
                deleted_message_id,
                guild_id,
                ..
            } => {
                let Some(guild_id) = guild_id else {
                    return Ok(());
                };
                let message = data
                    .cache
                    .take_message(*deleted_message_id)
                    .unwrap_or_else(|| MessageSnapshot {
                        id: *deleted_message_id,
                        channel_id: *channel_id,
                        guild_id: Some(*guild_id),
                        author: None,
                        content: None,
                    });

                let log = LogContext::new(ctx, data, *guild_id);
                super::handle_delete(&log, &message).await?;
            }
            _ => {}
        }
        Ok(())
    })
}

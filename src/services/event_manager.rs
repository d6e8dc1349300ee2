use crate::modules::{Module, get_modules};
use crate::snapshot::EmojiSnapshot;
use crate::{Data, Error};
use poise::serenity_prelude as serenity;
use tracing::{error, info};

pub const PRESENCE: &str = "Everything in the Servers";

/// Fans every gateway event out to the log modules.
pub struct EventManager {
    modules: Vec<Module>,
}

impl EventManager {
    pub fn new() -> Self {
        Self {
            modules: get_modules(),
        }
    }

    pub async fn dispatch(&self, ctx: &serenity::Context, event: &serenity::FullEvent, data: &Data) {
        // 1. Core / Service handling
        match event {
            serenity::FullEvent::Ready { data_about_bot, .. } => {
                info!("Logged in as {}", data_about_bot.user.name);
                ctx.set_presence(
                    Some(serenity::ActivityData::watching(PRESENCE)),
                    serenity::OnlineStatus::Online,
                );
            }
            serenity::FullEvent::GuildCreate { guild, is_new, .. } => {
                if is_new.unwrap_or(false) {
                    info!("Joined new guild: {} ({})", guild.name, guild.id);
                }
                let emojis = guild.emojis.values().map(EmojiSnapshot::from).collect();
                data.cache.seed_emojis(guild.id, emojis);
            }
            serenity::FullEvent::GuildDelete { incomplete, .. } => {
                if !incomplete.unavailable {
                    info!("Left guild: {}", incomplete.id);
                    data.cache.forget_guild(incomplete.id);
                }
            }
            serenity::FullEvent::ChannelDelete { channel, .. }
            | serenity::FullEvent::CategoryDelete {
                category: channel, ..
            } => {
                data.logger
                    .registry()
                    .forget_channel(channel.guild_id, channel.id);
            }
            _ => {}
        }

        // 2. Module dispatch, sequential within one event
        for module in &self.modules {
            for handler in &module.event_handlers {
                if let Err(e) = handler(ctx, event, data).await {
                    error!(
                        "Error in event handler for module {}: {:?}",
                        module.definition.id, e
                    );
                }
            }
        }
    }
}

/// poise event hook.
pub async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    data.events.dispatch(ctx, event, data).await;
    Ok(())
}

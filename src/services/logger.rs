use crate::Error;
use crate::services::gateway::GuildGateway;
use crate::services::log_channels::{LogChannel, LogChannelRegistry};
use crate::services::notification::Notification;
use crate::services::notifier::Notifier;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::debug;

/// Routes notifications to a guild's log channels.
pub struct LoggerService {
    gateway: GuildGateway,
    registry: Arc<LogChannelRegistry>,
}

impl LoggerService {
    pub fn new(gateway: GuildGateway, registry: Arc<LogChannelRegistry>) -> Self {
        Self { gateway, registry }
    }

    pub fn gateway(&self) -> &GuildGateway {
        &self.gateway
    }

    pub fn registry(&self) -> &LogChannelRegistry {
        &self.registry
    }
}

#[async_trait]
impl Notifier for LoggerService {
    /// Sends to the resolved log channel. A guild without that channel is not
    /// an error: nothing is sent and `false` is returned.
    async fn notify(
        &self,
        guild_id: serenity::GuildId,
        channel: LogChannel,
        notification: Notification,
    ) -> Result<bool, Error> {
        let Some(channel_id) = self
            .registry
            .resolve(&self.gateway, guild_id, channel)
            .await?
        else {
            debug!("No {} channel in guild {}, skipping", channel.name(), guild_id);
            return Ok(false);
        };

        self.gateway.send(channel_id, &notification).await?;
        Ok(true)
    }
}

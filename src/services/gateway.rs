use crate::Error;
use crate::services::audit::{AuditAction, AuditRecord, AuditTrail};
use crate::services::log_channels::{ChannelDirectory, ChannelEntry, NewChannel, RoleEntry};
use crate::services::notification::Notification;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// The serenity-backed side of every outbound call the bot makes.
///
/// Reads prefer the gateway cache and fall back to HTTP for guilds the cache
/// has not seen yet.
#[derive(Clone)]
pub struct GuildGateway {
    http: Arc<serenity::Http>,
    cache: Arc<serenity::Cache>,
}

impl GuildGateway {
    pub fn new(http: Arc<serenity::Http>, cache: Arc<serenity::Cache>) -> Self {
        Self { http, cache }
    }

    pub async fn send(
        &self,
        channel_id: serenity::ChannelId,
        notification: &Notification,
    ) -> Result<(), Error> {
        let message = serenity::CreateMessage::new()
            .embed(notification.to_embed())
            .allowed_mentions(serenity::CreateAllowedMentions::new());

        channel_id.send_message(&*self.http, message).await?;
        Ok(())
    }
}

#[async_trait]
impl ChannelDirectory for GuildGateway {
    async fn channels(&self, guild_id: serenity::GuildId) -> Result<Vec<ChannelEntry>, Error> {
        let cached: Option<Vec<ChannelEntry>> = self
            .cache
            .guild(guild_id)
            .map(|guild| guild.channels.values().map(ChannelEntry::from).collect());

        match cached {
            Some(channels) => Ok(channels),
            None => Ok(guild_id
                .channels(&*self.http)
                .await?
                .values()
                .map(ChannelEntry::from)
                .collect()),
        }
    }

    async fn roles(&self, guild_id: serenity::GuildId) -> Result<Vec<RoleEntry>, Error> {
        let to_entry = |role: &serenity::Role| RoleEntry {
            id: role.id,
            position: role.position,
        };

        let cached: Option<Vec<RoleEntry>> = self
            .cache
            .guild(guild_id)
            .map(|guild| guild.roles.values().map(to_entry).collect());

        match cached {
            Some(roles) => Ok(roles),
            None => Ok(guild_id
                .roles(&*self.http)
                .await?
                .values()
                .map(to_entry)
                .collect()),
        }
    }

    async fn create_channel(
        &self,
        guild_id: serenity::GuildId,
        request: NewChannel,
    ) -> Result<ChannelEntry, Error> {
        let overwrites: Vec<serenity::PermissionOverwrite> = request
            .overwrites
            .iter()
            .map(|overwrite| overwrite.to_overwrite())
            .collect();

        let mut builder = serenity::CreateChannel::new(request.name)
            .kind(request.kind)
            .permissions(overwrites);
        if let Some(parent) = request.parent {
            builder = builder.category(parent);
        }

        let channel = guild_id.create_channel(&*self.http, builder).await?;
        Ok(ChannelEntry::from(&channel))
    }
}

#[async_trait]
impl AuditTrail for GuildGateway {
    async fn latest(
        &self,
        guild_id: serenity::GuildId,
        action: AuditAction,
    ) -> Result<Option<AuditRecord>, Error> {
        let logs = guild_id
            .audit_logs(&*self.http, Some(action.into()), None, None, Some(1))
            .await?;

        Ok(logs.entries.into_iter().next().map(AuditRecord::from))
    }
}

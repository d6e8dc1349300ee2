//! Log channel discovery and provisioning.
//!
//! A guild's log channels are remembered by id for the lifetime of the
//! session. Name search is only the fallback for channels the registry has
//! not seen yet (created before this session, or by hand). When several
//! channels share a name the oldest one wins.

use crate::Error;
use async_trait::async_trait;
use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use std::cmp::Reverse;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogChannel {
    MemberLog,
    MessageLog,
    ServerLog,
    UserLog,
    VoiceLog,
}

impl LogChannel {
    /// Provisioning order used by the setup command.
    pub const ALL: [LogChannel; 5] = [
        LogChannel::MemberLog,
        LogChannel::ServerLog,
        LogChannel::VoiceLog,
        LogChannel::MessageLog,
        LogChannel::UserLog,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LogChannel::MemberLog => "member-log",
            LogChannel::MessageLog => "msg-log",
            LogChannel::ServerLog => "server-log",
            LogChannel::UserLog => "user-log",
            LogChannel::VoiceLog => "voice-log",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntry {
    pub id: serenity::ChannelId,
    pub name: String,
    pub kind: serenity::ChannelType,
}

impl From<&serenity::GuildChannel> for ChannelEntry {
    fn from(channel: &serenity::GuildChannel) -> Self {
        Self {
            id: channel.id,
            name: channel.name.clone(),
            kind: channel.kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleEntry {
    pub id: serenity::RoleId,
    pub position: u16,
}

/// A VIEW_CHANNEL allow or deny for one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOverwrite {
    pub role: serenity::RoleId,
    pub allow: bool,
}

impl ViewOverwrite {
    pub fn to_overwrite(&self) -> serenity::PermissionOverwrite {
        let (allow, deny) = if self.allow {
            (serenity::Permissions::VIEW_CHANNEL, serenity::Permissions::empty())
        } else {
            (serenity::Permissions::empty(), serenity::Permissions::VIEW_CHANNEL)
        };
        serenity::PermissionOverwrite {
            allow,
            deny,
            kind: serenity::PermissionOverwriteType::Role(self.role),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChannel {
    pub name: String,
    pub kind: serenity::ChannelType,
    pub parent: Option<serenity::ChannelId>,
    pub overwrites: Vec<ViewOverwrite>,
}

/// Read and create access to a guild's channel list.
#[async_trait]
pub trait ChannelDirectory: Send + Sync {
    async fn channels(&self, guild_id: serenity::GuildId) -> Result<Vec<ChannelEntry>, Error>;

    async fn roles(&self, guild_id: serenity::GuildId) -> Result<Vec<RoleEntry>, Error>;

    async fn create_channel(
        &self,
        guild_id: serenity::GuildId,
        request: NewChannel,
    ) -> Result<ChannelEntry, Error>;
}

/// Outcome of an ensure call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provisioned {
    pub id: serenity::ChannelId,
    pub created: bool,
}

/// Oldest channel of the given kind whose name matches exactly.
pub fn find_by_name(
    channels: &[ChannelEntry],
    name: &str,
    kind: serenity::ChannelType,
) -> Option<serenity::ChannelId> {
    channels
        .iter()
        .filter(|channel| channel.kind == kind && channel.name == name)
        .map(|channel| channel.id)
        .min()
}

/// Highest role by position; on equal positions the older role ranks higher.
pub fn highest_role(roles: &[RoleEntry]) -> Option<serenity::RoleId> {
    roles
        .iter()
        .max_by_key(|role| (role.position, Reverse(role.id)))
        .map(|role| role.id)
}

/// Hide from @everyone, show to the highest role.
pub fn restricted_overwrites(
    guild_id: serenity::GuildId,
    roles: &[RoleEntry],
) -> Vec<ViewOverwrite> {
    let everyone = serenity::RoleId::new(guild_id.get());
    let mut overwrites = vec![ViewOverwrite {
        role: everyone,
        allow: false,
    }];

    if let Some(highest) = highest_role(roles).filter(|role| *role != everyone) {
        overwrites.push(ViewOverwrite {
            role: highest,
            allow: true,
        });
    }

    overwrites
}

#[derive(Default)]
pub struct LogChannelRegistry {
    entries: DashMap<(serenity::GuildId, LogChannel), serenity::ChannelId>,
}

impl LogChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn remembered(
        &self,
        guild_id: serenity::GuildId,
        kind: LogChannel,
    ) -> Option<serenity::ChannelId> {
        self.entries.get(&(guild_id, kind)).map(|entry| *entry.value())
    }

    fn remember(&self, guild_id: serenity::GuildId, kind: LogChannel, id: serenity::ChannelId) {
        self.entries.insert((guild_id, kind), id);
    }

    /// Finds the log channel for `kind`. Never creates anything.
    pub async fn resolve(
        &self,
        directory: &dyn ChannelDirectory,
        guild_id: serenity::GuildId,
        kind: LogChannel,
    ) -> Result<Option<serenity::ChannelId>, Error> {
        let channels = directory.channels(guild_id).await?;

        if let Some(id) = self.remembered(guild_id, kind) {
            if channels.iter().any(|channel| channel.id == id) {
                return Ok(Some(id));
            }
            debug!("Remembered {} channel {} is gone", kind.name(), id);
            self.entries.remove(&(guild_id, kind));
        }

        let found = find_by_name(&channels, kind.name(), serenity::ChannelType::Text);
        if let Some(id) = found {
            self.remember(guild_id, kind, id);
        }
        Ok(found)
    }

    /// Finds the log channel for `kind`, creating it under `category` if missing.
    pub async fn ensure(
        &self,
        directory: &dyn ChannelDirectory,
        guild_id: serenity::GuildId,
        category: serenity::ChannelId,
        kind: LogChannel,
    ) -> Result<Provisioned, Error> {
        if let Some(id) = self.resolve(directory, guild_id, kind).await? {
            return Ok(Provisioned { id, created: false });
        }

        let roles = directory.roles(guild_id).await?;
        let channel = directory
            .create_channel(
                guild_id,
                NewChannel {
                    name: kind.name().to_string(),
                    kind: serenity::ChannelType::Text,
                    parent: Some(category),
                    overwrites: restricted_overwrites(guild_id, &roles),
                },
            )
            .await?;

        info!("Created {} channel {} in guild {}", kind.name(), channel.id, guild_id);
        self.remember(guild_id, kind, channel.id);
        Ok(Provisioned {
            id: channel.id,
            created: true,
        })
    }

    /// Finds the category called `name`, creating it if missing.
    pub async fn ensure_category(
        &self,
        directory: &dyn ChannelDirectory,
        guild_id: serenity::GuildId,
        name: &str,
    ) -> Result<Provisioned, Error> {
        let channels = directory.channels(guild_id).await?;
        if let Some(id) = find_by_name(&channels, name, serenity::ChannelType::Category) {
            return Ok(Provisioned { id, created: false });
        }

        let category = directory
            .create_channel(
                guild_id,
                NewChannel {
                    name: name.to_string(),
                    kind: serenity::ChannelType::Category,
                    parent: None,
                    overwrites: vec![],
                },
            )
            .await?;

        info!("Created category {} in guild {}", category.id, guild_id);
        Ok(Provisioned {
            id: category.id,
            created: true,
        })
    }

    /// Drops every registry entry pointing at a deleted channel.
    pub fn forget_channel(&self, guild_id: serenity::GuildId, channel_id: serenity::ChannelId) {
        self.entries
            .retain(|(guild, _), id| !(*guild == guild_id && *id == channel_id));
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// In-memory guild with a channel list and role hierarchy.
    pub struct FakeDirectory {
        pub channels: Mutex<Vec<ChannelEntry>>,
        pub roles: Vec<RoleEntry>,
        pub created: Mutex<Vec<NewChannel>>,
        /// Creation fails once this many channels have been created.
        pub fail_after: Option<usize>,
        next_id: Mutex<u64>,
    }

    impl FakeDirectory {
        pub fn new(channels: Vec<ChannelEntry>, roles: Vec<RoleEntry>) -> Self {
            Self {
                channels: Mutex::new(channels),
                roles,
                created: Mutex::new(vec![]),
                fail_after: None,
                next_id: Mutex::new(1_000),
            }
        }

        pub fn created(&self) -> Vec<NewChannel> {
            self.created.lock().unwrap().clone()
        }

        pub fn rename(&self, id: serenity::ChannelId, name: &str) {
            let mut channels = self.channels.lock().unwrap();
            if let Some(channel) = channels.iter_mut().find(|c| c.id == id) {
                channel.name = name.to_string();
            }
        }

        pub fn remove(&self, id: serenity::ChannelId) {
            self.channels.lock().unwrap().retain(|c| c.id != id);
        }
    }

    pub fn text(id: u64, name: &str) -> ChannelEntry {
        ChannelEntry {
            id: serenity::ChannelId::new(id),
            name: name.to_string(),
            kind: serenity::ChannelType::Text,
        }
    }

    pub fn category(id: u64, name: &str) -> ChannelEntry {
        ChannelEntry {
            id: serenity::ChannelId::new(id),
            name: name.to_string(),
            kind: serenity::ChannelType::Category,
        }
    }

    #[async_trait]
    impl ChannelDirectory for FakeDirectory {
        async fn channels(&self, _guild_id: serenity::GuildId) -> Result<Vec<ChannelEntry>, Error> {
            Ok(self.channels.lock().unwrap().clone())
        }

        async fn roles(&self, _guild_id: serenity::GuildId) -> Result<Vec<RoleEntry>, Error> {
            Ok(self.roles.clone())
        }

        async fn create_channel(
            &self,
            _guild_id: serenity::GuildId,
            request: NewChannel,
        ) -> Result<ChannelEntry, Error> {
            let mut created = self.created.lock().unwrap();
            if self.fail_after.is_some_and(|limit| created.len() >= limit) {
                anyhow::bail!("Missing Permissions");
            }

            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let entry = ChannelEntry {
                id: serenity::ChannelId::new(*next_id),
                name: request.name.clone(),
                kind: request.kind,
            };
            created.push(request);
            self.channels.lock().unwrap().push(entry.clone());
            Ok(entry)
        }
    }
}

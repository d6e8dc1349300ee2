//! Owned snapshots of the platform entities the log handlers read.
//!
//! Serenity models are converted at the dispatch boundary so the formatting
//! and routing logic only ever sees these plain structs. Snapshots live for a
//! single event, except for messages and emojis which are also kept by the
//! object cache.

use poise::serenity_prelude as serenity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSnapshot {
    pub id: serenity::UserId,
    pub tag: String,
    pub bot: bool,
    pub avatar_hash: Option<String>,
    pub avatar_url: String,
    /// Account creation time, unix seconds.
    pub created_at: i64,
}

impl UserSnapshot {
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id.get())
    }
}

impl From<&serenity::User> for UserSnapshot {
    fn from(user: &serenity::User) -> Self {
        Self {
            id: user.id,
            tag: user.tag(),
            bot: user.bot,
            avatar_hash: user.avatar.as_ref().map(|hash| hash.to_string()),
            avatar_url: user.face(),
            created_at: user.id.created_at().unix_timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSnapshot {
    pub user: UserSnapshot,
    pub nick: Option<String>,
    pub roles: Vec<serenity::RoleId>,
    /// End of the member's timeout, unix seconds.
    pub timeout_until: Option<i64>,
}

impl From<&serenity::Member> for MemberSnapshot {
    fn from(member: &serenity::Member) -> Self {
        Self {
            user: UserSnapshot::from(&member.user),
            nick: member.nick.clone(),
            roles: member.roles.clone(),
            timeout_until: member
                .communication_disabled_until
                .map(|until| until.unix_timestamp()),
        }
    }
}

impl From<&serenity::GuildMemberUpdateEvent> for MemberSnapshot {
    fn from(event: &serenity::GuildMemberUpdateEvent) -> Self {
        Self {
            user: UserSnapshot::from(&event.user),
            nick: event.nick.clone(),
            roles: event.roles.clone(),
            timeout_until: event
                .communication_disabled_until
                .map(|until| until.unix_timestamp()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSnapshot {
    pub id: serenity::MessageId,
    pub channel_id: serenity::ChannelId,
    pub guild_id: Option<serenity::GuildId>,
    pub author: Option<UserSnapshot>,
    /// `None` when the event did not carry content (embed unfurls, pins).
    pub content: Option<String>,
}

impl From<&serenity::Message> for MessageSnapshot {
    fn from(message: &serenity::Message) -> Self {
        Self {
            id: message.id,
            channel_id: message.channel_id,
            guild_id: message.guild_id,
            author: Some(UserSnapshot::from(&message.author)),
            content: Some(message.content.clone()),
        }
    }
}

impl From<&serenity::MessageUpdateEvent> for MessageSnapshot {
    fn from(event: &serenity::MessageUpdateEvent) -> Self {
        Self {
            id: event.id,
            channel_id: event.channel_id,
            guild_id: event.guild_id,
            author: event.author.as_ref().map(UserSnapshot::from),
            content: event.content.clone(),
        }
    }
}

/// A channel reference with its display name when the cache knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    pub id: serenity::ChannelId,
    pub name: Option<String>,
}

impl ChannelRef {
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("<#{}>", self.id.get()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSnapshot {
    pub user_id: serenity::UserId,
    pub user: Option<UserSnapshot>,
    pub channel: Option<ChannelRef>,
}

impl VoiceSnapshot {
    pub fn from_state(state: &serenity::VoiceState, cache: &serenity::Cache) -> Self {
        let user = state
            .member
            .as_ref()
            .map(|member| UserSnapshot::from(&member.user))
            .or_else(|| cache.user(state.user_id).map(|user| UserSnapshot::from(&*user)));

        let channel = state.channel_id.map(|id| ChannelRef {
            id,
            name: state
                .guild_id
                .and_then(|guild_id| channel_name(cache, guild_id, id)),
        });

        Self {
            user_id: state.user_id,
            user,
            channel,
        }
    }
}

fn channel_name(
    cache: &serenity::Cache,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
) -> Option<String> {
    cache
        .guild(guild_id)
        .and_then(|guild| guild.channels.get(&channel_id).map(|c| c.name.clone()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSnapshot {
    pub name: String,
    pub kind: serenity::ChannelType,
    pub topic: Option<String>,
    pub parent_id: Option<serenity::ChannelId>,
    pub nsfw: bool,
    pub slowmode: Option<u16>,
}

impl From<&serenity::GuildChannel> for ChannelSnapshot {
    fn from(channel: &serenity::GuildChannel) -> Self {
        Self {
            name: channel.name.clone(),
            kind: channel.kind,
            topic: channel.topic.clone(),
            parent_id: channel.parent_id,
            nsfw: channel.nsfw,
            slowmode: channel.rate_limit_per_user,
        }
    }
}

/// Only the role fields whose changes are logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSnapshot {
    pub id: serenity::RoleId,
    pub name: String,
    pub color: u32,
    pub permissions: u64,
}

impl From<&serenity::Role> for RoleSnapshot {
    fn from(role: &serenity::Role) -> Self {
        Self {
            id: role.id,
            name: role.name.clone(),
            color: role.colour.0,
            permissions: role.permissions.bits(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiSnapshot {
    pub id: serenity::EmojiId,
    pub name: String,
    pub animated: bool,
}

impl EmojiSnapshot {
    /// Renders the emoji inline. Only valid while the emoji still exists.
    pub fn markup(&self) -> String {
        let prefix = if self.animated { "a" } else { "" };
        format!("<{}:{}:{}>", prefix, self.name, self.id.get())
    }
}

impl From<&serenity::Emoji> for EmojiSnapshot {
    fn from(emoji: &serenity::Emoji) -> Self {
        Self {
            id: emoji.id,
            name: emoji.name.clone(),
            animated: emoji.animated,
        }
    }
}

/// Guild-level details every notification needs: footer icon and locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildInfo {
    pub id: serenity::GuildId,
    pub icon_url: Option<String>,
    pub locale: String,
}

impl GuildInfo {
    pub fn from_cache(cache: &serenity::Cache, guild_id: serenity::GuildId) -> Self {
        cache
            .guild(guild_id)
            .map(|guild| Self {
                id: guild_id,
                icon_url: guild.icon_url(),
                locale: guild.preferred_locale.clone(),
            })
            .unwrap_or_else(|| Self {
                id: guild_id,
                icon_url: None,
                locale: "en-US".to_string(),
            })
    }
}

use crate::snapshot::{EmojiSnapshot, MessageSnapshot};
use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;

const MESSAGE_TTL: Duration = Duration::from_secs(6 * 60 * 60);
const CLEANUP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Session state the gateway cache does not keep for us: content of messages
/// (the serenity cache drops a message before its delete event is dispatched)
/// and the last known emoji set per guild.
pub struct ObjectCacheService {
    // Map: MessageID -> (Snapshot, Timestamp)
    messages: Arc<DashMap<serenity::MessageId, (MessageSnapshot, Instant)>>,
    emojis: DashMap<serenity::GuildId, Vec<EmojiSnapshot>>,
}

impl ObjectCacheService {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(DashMap::new()),
            emojis: DashMap::new(),
        }
    }

    pub fn start_cleanup_runner(&self) {
        let messages = Arc::clone(&self.messages);

        tokio::spawn(async move {
            loop {
                sleep(CLEANUP_INTERVAL).await;
                let now = Instant::now();
                let before = messages.len();
                messages.retain(|_, (_, time)| now.duration_since(*time) < MESSAGE_TTL);
                debug!("Message cache cleanup: {} -> {}", before, messages.len());
            }
        });
    }

    pub fn store_message(&self, message: MessageSnapshot) {
        self.messages.insert(message.id, (message, Instant::now()));
    }

    pub fn take_message(&self, message_id: serenity::MessageId) -> Option<MessageSnapshot> {
        self.messages
            .remove(&message_id)
            .map(|(_, (message, _))| message)
    }

    /// Stores new content for a tracked message and returns the previous snapshot.
    pub fn update_message(
        &self,
        message_id: serenity::MessageId,
        content: &str,
    ) -> Option<MessageSnapshot> {
        let mut entry = self.messages.get_mut(&message_id)?;
        let (message, time) = entry.value_mut();
        let previous = message.clone();
        message.content = Some(content.to_string());
        *time = Instant::now();
        Some(previous)
    }

    /// Records the emoji set seen when a guild becomes available.
    pub fn seed_emojis(&self, guild_id: serenity::GuildId, emojis: Vec<EmojiSnapshot>) {
        self.emojis.insert(guild_id, emojis);
    }

    /// Stores the current emoji set and returns the one it replaced, if the
    /// guild had been seen before.
    pub fn replace_emojis(
        &self,
        guild_id: serenity::GuildId,
        emojis: Vec<EmojiSnapshot>,
    ) -> Option<Vec<EmojiSnapshot>> {
        self.emojis.insert(guild_id, emojis)
    }

    pub fn forget_guild(&self, guild_id: serenity::GuildId) {
        self.emojis.remove(&guild_id);
        self.messages
            .retain(|_, (message, _)| message.guild_id != Some(guild_id));
    }
}

use crate::services::audit::AuditTrail;
use crate::services::localization::L10nProxy;
use crate::services::log_channels::LogChannel;
use crate::services::notification::Notification;
use crate::snapshot::GuildInfo;
use crate::{Data, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;

/// Delivers a notification to one of a guild's log channels.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Returns whether the log channel existed and the notification was sent.
    async fn notify(
        &self,
        guild_id: serenity::GuildId,
        channel: LogChannel,
        notification: Notification,
    ) -> Result<bool, Error>;
}

/// Everything a log handler needs for one event in one guild.
pub struct LogContext<'a> {
    pub guild: GuildInfo,
    pub l10n: L10nProxy,
    pub notifier: &'a dyn Notifier,
    pub audit: &'a dyn AuditTrail,
}

impl<'a> LogContext<'a> {
    pub fn new(ctx: &serenity::Context, data: &'a Data, guild_id: serenity::GuildId) -> Self {
        let guild = GuildInfo::from_cache(&ctx.cache, guild_id);
        let l10n = data.l10n.get_proxy(&guild.locale);

        Self {
            guild,
            l10n,
            notifier: &*data.logger,
            audit: data.logger.gateway(),
        }
    }

    pub fn t(&self, key: &str) -> String {
        self.l10n.t(key, None)
    }

    /// Footer with the guild icon, used by every log except messages.
    pub fn guild_footer(&self, notification: Notification, key: &str) -> Notification {
        notification.footer(self.t(key), self.guild.icon_url.clone())
    }

    pub async fn send(
        &self,
        channel: LogChannel,
        notification: Notification,
    ) -> Result<bool, Error> {
        self.notifier
            .notify(self.guild.id, channel, notification)
            .await
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::services::audit::testing::FakeAudit;
    use crate::services::localization::LocalizationManager;
    use std::sync::{Arc, Mutex};

    /// Records deliveries. Only channels listed in `available` exist.
    pub struct RecordingNotifier {
        pub available: Vec<LogChannel>,
        pub sent: Mutex<Vec<(LogChannel, Notification)>>,
    }

    impl RecordingNotifier {
        pub fn with(available: &[LogChannel]) -> Self {
            Self {
                available: available.to_vec(),
                sent: Mutex::new(vec![]),
            }
        }

        pub fn all() -> Self {
            Self::with(&LogChannel::ALL)
        }

        pub fn sent(&self) -> Vec<(LogChannel, Notification)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(
            &self,
            _guild_id: serenity::GuildId,
            channel: LogChannel,
            notification: Notification,
        ) -> Result<bool, Error> {
            if !self.available.contains(&channel) {
                return Ok(false);
            }
            self.sent.lock().unwrap().push((channel, notification));
            Ok(true)
        }
    }

    pub fn log_context<'a>(notifier: &'a RecordingNotifier, audit: &'a FakeAudit) -> LogContext<'a> {
        LogContext {
            guild: GuildInfo {
                id: serenity::GuildId::new(1),
                icon_url: Some("https://cdn.example/icon.png".to_string()),
                locale: "en-US".to_string(),
            },
            l10n: Arc::new(LocalizationManager::new()).get_proxy("en-US"),
            notifier,
            audit,
        }
    }
}

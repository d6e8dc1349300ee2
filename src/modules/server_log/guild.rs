use super::{line, server_notification};
use crate::Error;
use crate::services::log_channels::LogChannel;
use crate::services::notification::Tone;
use crate::services::notifier::LogContext;

/// Only renames are logged. Without the previous name there is nothing to compare.
pub async fn handle_guild_update(
    log: &LogContext<'_>,
    old_name: Option<&str>,
    new_name: &str,
) -> Result<(), Error> {
    let Some(old_name) = old_name.filter(|old| *old != new_name) else {
        return Ok(());
    };

    let lines = [
        line(log, "log-line-old-name", &[("name", old_name.to_string())]),
        line(log, "log-line-new-name", &[("name", new_name.to_string())]),
    ];
    log.send(
        LogChannel::ServerLog,
        server_notification(log, Tone::Blue, "log-guild-name-title", &lines),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::audit::testing::FakeAudit;
    use crate::services::notifier::testing::{RecordingNotifier, log_context};

    #[tokio::test]
    async fn test_rename_is_logged_once() {
        let notifier = RecordingNotifier::all();
        let audit = FakeAudit::default();
        let log = log_context(&notifier, &audit);

        handle_guild_update(&log, Some("Old Town"), "New Town").await.unwrap();
        handle_guild_update(&log, Some("New Town"), "New Town").await.unwrap();
        handle_guild_update(&log, None, "New Town").await.unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].1.description.as_deref(),
            Some("**Old Name:** Old Town\n**New Name:** New Town")
        );
    }
}

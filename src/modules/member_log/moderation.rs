use crate::Error;
use crate::services::audit::{
    AuditAction, Attribution, Confidence, KICK_MATCH_WINDOW_SECS, attribute,
};
use crate::services::log_channels::LogChannel;
use crate::services::notification::{Notification, Tone};
use crate::services::notifier::LogContext;
use crate::snapshot::UserSnapshot;

fn moderation_notification(
    log: &LogContext<'_>,
    tone: Tone,
    title_key: &str,
    desc_key: &str,
    user: &UserSnapshot,
) -> Notification {
    Notification::new(tone, log.t(title_key))
        .description(log.l10n.t_user(desc_key, &user.tag))
        .field(log.t("log-field-user-id"), user.id.to_string(), true)
        .thumbnail(user.avatar_url.clone())
}

pub fn ban_notification(
    log: &LogContext<'_>,
    user: &UserSnapshot,
    attribution: &Attribution,
) -> Notification {
    let reason = if attribution.has_entry() {
        attribution
            .reason()
            .map(str::to_string)
            .unwrap_or_else(|| log.t("log-reason-none"))
    } else {
        log.t("log-reason-unknown")
    };

    let mut notification = moderation_notification(
        log,
        Tone::Red,
        "log-member-ban-title",
        "log-member-ban-desc",
        user,
    )
    .field(log.t("log-field-reason"), reason, true);

    // Without any entry the reason already reads as unknown.
    if attribution.has_entry() && attribution.confidence() == Confidence::Unverified {
        notification = notification.field(
            log.t("log-field-attribution"),
            log.t("log-attribution-unverified"),
            false,
        );
    }

    log.guild_footer(notification, "log-footer-member")
}

pub async fn handle_ban(log: &LogContext<'_>, user: &UserSnapshot, now: i64) -> Result<(), Error> {
    let attribution = attribute(log.audit, log.guild.id, AuditAction::Ban, user.id, now).await;
    log.send(LogChannel::MemberLog, ban_notification(log, user, &attribution))
        .await?;
    Ok(())
}

pub async fn handle_unban(log: &LogContext<'_>, user: &UserSnapshot) -> Result<(), Error> {
    let notification = moderation_notification(
        log,
        Tone::Green,
        "log-member-unban-title",
        "log-member-unban-desc",
        user,
    );
    log.send(
        LogChannel::MemberLog,
        log.guild_footer(notification, "log-footer-member"),
    )
    .await?;
    Ok(())
}

/// Logs a removal as a kick only when the newest kick entry targets this user
/// and is recent. Anything else, including an unreadable audit log, is a
/// voluntary leave as far as the member log is concerned.
pub async fn handle_kick(log: &LogContext<'_>, user: &UserSnapshot, now: i64) -> Result<(), Error> {
    let attribution = attribute(log.audit, log.guild.id, AuditAction::Kick, user.id, now).await;
    let Attribution::Matched { reason, age_secs } = attribution else {
        return Ok(());
    };
    if age_secs > KICK_MATCH_WINDOW_SECS {
        return Ok(());
    }

    let notification = moderation_notification(
        log,
        Tone::Red,
        "log-member-kick-title",
        "log-member-kick-desc",
        user,
    )
    .field(
        log.t("log-field-reason"),
        reason.unwrap_or_else(|| log.t("log-reason-none")),
        true,
    );

    log.send(
        LogChannel::MemberLog,
        log.guild_footer(notification, "log-footer-member"),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::audit::testing::FakeAudit;
    use crate::services::notifier::testing::{RecordingNotifier, log_context};
    use crate::snapshot::testing::user;

    const NOW: i64 = 1_700_000_000;

    #[tokio::test]
    async fn test_kick_with_foreign_target_is_not_logged() {
        let notifier = RecordingNotifier::all();
        let audit = FakeAudit::with_entry(99, Some("spam"), NOW - 2);
        let log = log_context(&notifier, &audit);

        handle_kick(&log, &user(7, "ash#0001"), NOW).await.unwrap();

        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_stale_kick_entry_is_not_logged() {
        let notifier = RecordingNotifier::all();
        let audit = FakeAudit::with_entry(7, None, NOW - KICK_MATCH_WINDOW_SECS - 1);
        let log = log_context(&notifier, &audit);

        handle_kick(&log, &user(7, "ash#0001"), NOW).await.unwrap();

        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_kick_without_audit_access_is_not_logged() {
        let notifier = RecordingNotifier::all();
        let audit = FakeAudit::unavailable();
        let log = log_context(&notifier, &audit);

        handle_kick(&log, &user(7, "ash#0001"), NOW).await.unwrap();

        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_matching_kick_is_logged_with_reason() {
        let notifier = RecordingNotifier::all();
        let audit = FakeAudit::with_entry(7, None, NOW - 3);
        let log = log_context(&notifier, &audit);

        handle_kick(&log, &user(7, "ash#0001"), NOW).await.unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, LogChannel::MemberLog);
        assert_eq!(sent[0].1.title, "🚪 Member Kicked");
        assert_eq!(sent[0].1.field_value("Reason"), Some("No reason provided"));
    }

    #[tokio::test]
    async fn test_ban_reason_fallbacks() {
        let notifier = RecordingNotifier::all();
        let audit = FakeAudit::default();
        let log = log_context(&notifier, &audit);
        let banned = user(7, "ash#0001");

        handle_ban(&log, &banned, NOW).await.unwrap();

        let sent = notifier.sent();
        assert_eq!(sent[0].1.description.as_deref(), Some("**ash#0001** has been banned."));
        assert_eq!(sent[0].1.field_value("Reason"), Some("Unknown reason"));
        assert_eq!(sent[0].1.field_value("Attribution"), None);

        let matched = Attribution::Matched {
            reason: None,
            age_secs: 1,
        };
        assert_eq!(
            ban_notification(&log, &banned, &matched).field_value("Reason"),
            Some("No reason provided")
        );
    }

    #[tokio::test]
    async fn test_unmatched_ban_entry_is_flagged() {
        let notifier = RecordingNotifier::all();
        let audit = FakeAudit::with_entry(99, Some("raid"), NOW);
        let log = log_context(&notifier, &audit);

        handle_ban(&log, &user(7, "ash#0001"), NOW).await.unwrap();

        let sent = notifier.sent();
        assert_eq!(sent[0].1.field_value("Reason"), Some("raid"));
        assert!(sent[0].1.field_value("Attribution").is_some());
    }

    #[tokio::test]
    async fn test_unban_without_member_log_sends_nothing() {
        let notifier = RecordingNotifier::with(&[LogChannel::UserLog]);
        let audit = FakeAudit::default();
        let log = log_context(&notifier, &audit);

        handle_unban(&log, &user(7, "ash#0001")).await.unwrap();

        assert!(notifier.sent().is_empty());
    }
}

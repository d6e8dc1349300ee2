//! Profile changes of a single member: nickname, avatar, roles and timeout.

use super::role_mentions;
use crate::Error;
use crate::services::log_channels::LogChannel;
use crate::services::notification::{Notification, Tone};
use crate::services::notifier::LogContext;
use crate::snapshot::MemberSnapshot;
use poise::serenity_prelude as serenity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberChange {
    Nickname,
    Avatar,
    Roles {
        added: Vec<serenity::RoleId>,
        removed: Vec<serenity::RoleId>,
    },
    TimedOut {
        until: i64,
    },
    TimeoutRemoved,
}

/// Roles gained and lost, in the order they appear on the member.
pub fn role_diff(
    old: &[serenity::RoleId],
    new: &[serenity::RoleId],
) -> (Vec<serenity::RoleId>, Vec<serenity::RoleId>) {
    let added = new.iter().filter(|r| !old.contains(r)).copied().collect();
    let removed = old.iter().filter(|r| !new.contains(r)).copied().collect();
    (added, removed)
}

pub fn diff(old: &MemberSnapshot, new: &MemberSnapshot) -> Vec<MemberChange> {
    let mut changes = vec![];

    if old.nick != new.nick {
        changes.push(MemberChange::Nickname);
    }
    if old.user.avatar_hash != new.user.avatar_hash {
        changes.push(MemberChange::Avatar);
    }

    let (added, removed) = role_diff(&old.roles, &new.roles);
    if !added.is_empty() || !removed.is_empty() {
        changes.push(MemberChange::Roles { added, removed });
    }

    match (old.timeout_until, new.timeout_until) {
        (old_until, Some(until)) if old_until != Some(until) => {
            changes.push(MemberChange::TimedOut { until });
        }
        (Some(_), None) => changes.push(MemberChange::TimeoutRemoved),
        _ => {}
    }

    changes
}

pub fn change_notification(
    log: &LogContext<'_>,
    member: &MemberSnapshot,
    change: &MemberChange,
) -> Notification {
    let l10n = &log.l10n;
    let user = &member.user;

    let notification = match change {
        MemberChange::Nickname => Notification::new(Tone::Blue, log.t("log-member-nick-title"))
            .description(l10n.t_user("log-member-nick-desc", &user.tag))
            .field(
                log.t("log-member-nick-field"),
                member.nick.clone().unwrap_or_else(|| log.t("log-none")),
                true,
            ),
        MemberChange::Avatar => Notification::new(Tone::Green, log.t("log-member-avatar-title"))
            .description(l10n.t_user("log-member-avatar-desc", &user.tag))
            .image(user.avatar_url.clone()),
        MemberChange::Roles { added, removed } => {
            let none = log.t("log-none");
            Notification::new(Tone::Purple, log.t("log-member-roles-title"))
                .description(l10n.t_user("log-member-roles-desc", &user.tag))
                .field(log.t("log-member-roles-added"), role_mentions(added, &none), true)
                .field(log.t("log-member-roles-removed"), role_mentions(removed, &none), true)
        }
        MemberChange::TimedOut { until } => {
            Notification::new(Tone::Orange, log.t("log-member-timeout-title"))
                .description(l10n.t_user("log-member-timeout-desc", &user.tag))
                .field(log.t("log-field-user-id"), user.id.to_string(), true)
                .field(log.t("log-member-timeout-until"), format!("<t:{}:R>", until), true)
                .thumbnail(user.avatar_url.clone())
        }
        MemberChange::TimeoutRemoved => {
            Notification::new(Tone::Green, log.t("log-member-untimeout-title"))
                .description(l10n.t_user("log-member-untimeout-desc", &user.tag))
                .field(log.t("log-field-user-id"), user.id.to_string(), true)
                .thumbnail(user.avatar_url.clone())
        }
    };

    log.guild_footer(notification, "log-footer-member")
}

/// Sends one member-log notification per detected change.
pub async fn handle_member_update(
    log: &LogContext<'_>,
    old: &MemberSnapshot,
    new: &MemberSnapshot,
) -> Result<(), Error> {
    for change in diff(old, new) {
        let notification = change_notification(log, new, &change);
        if !log.send(LogChannel::MemberLog, notification).await? {
            // No member-log channel, the remaining changes would miss as well.
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::audit::testing::FakeAudit;
    use crate::services::notifier::testing::{RecordingNotifier, log_context};
    use crate::snapshot::testing::member;

    fn roles(ids: &[u64]) -> Vec<serenity::RoleId> {
        ids.iter().map(|id| serenity::RoleId::new(*id)).collect()
    }

    #[test]
    fn test_unchanged_member_has_no_changes() {
        let mut old = member(7, "ash#0001");
        old.nick = Some("Ash".to_string());
        old.roles = roles(&[3, 4]);
        old.timeout_until = Some(2_000_000_000);

        assert!(diff(&old, &old.clone()).is_empty());
    }

    #[test]
    fn test_role_diff_is_disjoint() {
        let (added, removed) = role_diff(&roles(&[1, 2, 3]), &roles(&[2, 3, 4, 5]));
        assert_eq!(added, roles(&[4, 5]));
        assert_eq!(removed, roles(&[1]));
        assert!(added.iter().all(|r| !removed.contains(r)));

        let (added, removed) = role_diff(&roles(&[2, 1]), &roles(&[1, 2]));
        assert!(added.is_empty() && removed.is_empty());
    }

    #[test]
    fn test_role_reorder_is_not_a_change() {
        let mut old = member(7, "ash#0001");
        old.roles = roles(&[1, 2]);
        let mut new = old.clone();
        new.roles = roles(&[2, 1]);

        assert!(diff(&old, &new).is_empty());
    }

    #[test]
    fn test_timeout_transitions() {
        let old = member(7, "ash#0001");
        let mut timed_out = old.clone();
        timed_out.timeout_until = Some(1_900_000_000);

        assert_eq!(
            diff(&old, &timed_out),
            vec![MemberChange::TimedOut {
                until: 1_900_000_000
            }]
        );
        assert_eq!(diff(&timed_out, &old), vec![MemberChange::TimeoutRemoved]);

        let mut extended = timed_out.clone();
        extended.timeout_until = Some(1_900_003_600);
        assert_eq!(
            diff(&timed_out, &extended),
            vec![MemberChange::TimedOut {
                until: 1_900_003_600
            }]
        );
        assert!(diff(&timed_out, &timed_out).is_empty());
    }

    #[tokio::test]
    async fn test_timeout_sends_exactly_one_member_log() {
        let notifier = RecordingNotifier::all();
        let audit = FakeAudit::default();
        let log = log_context(&notifier, &audit);

        let old = member(7, "ash#0001");
        let mut new = old.clone();
        new.timeout_until = Some(1_900_000_000);

        handle_member_update(&log, &old, &new).await.unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, LogChannel::MemberLog);
        assert_eq!(sent[0].1.title, "⏳ Member Timed Out");
        assert_eq!(sent[0].1.field_value("User ID"), Some("7"));
        assert_eq!(sent[0].1.field_value("Until"), Some("<t:1900000000:R>"));
    }

    #[tokio::test]
    async fn test_each_change_is_its_own_notification() {
        let notifier = RecordingNotifier::all();
        let audit = FakeAudit::default();
        let log = log_context(&notifier, &audit);

        let old = member(7, "ash#0001");
        let mut new = old.clone();
        new.nick = Some("Ashen".to_string());
        new.user.avatar_hash = Some("b2".to_string());
        new.roles = roles(&[9]);

        handle_member_update(&log, &old, &new).await.unwrap();

        let titles: Vec<String> = notifier.sent().into_iter().map(|(_, n)| n.title).collect();
        assert_eq!(
            titles,
            vec!["👤 Nickname Updated", "🖼️ Avatar Updated", "🔄 Role Updated"]
        );
        let roles_log = &notifier.sent()[2].1;
        assert_eq!(roles_log.field_value("Added Roles"), Some("<@&9>"));
        assert_eq!(roles_log.field_value("Removed Roles"), Some("None"));
        assert_eq!(
            roles_log.footer.as_ref().map(|f| f.text.as_str()),
            Some("Member Log")
        );
    }

    #[tokio::test]
    async fn test_cleared_nickname_shows_none() {
        let notifier = RecordingNotifier::all();
        let audit = FakeAudit::default();
        let log = log_context(&notifier, &audit);

        let mut old = member(7, "ash#0001");
        old.nick = Some("Ash".to_string());
        let new = member(7, "ash#0001");

        handle_member_update(&log, &old, &new).await.unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.field_value("New Nickname"), Some("None"));
    }
}

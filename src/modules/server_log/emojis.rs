use super::{line, server_notification};
use crate::Error;
use crate::services::log_channels::LogChannel;
use crate::services::notification::{Notification, Tone};
use crate::services::notifier::LogContext;
use crate::snapshot::EmojiSnapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmojiChange {
    Created(EmojiSnapshot),
    Renamed { old_name: String, emoji: EmojiSnapshot },
    Deleted(EmojiSnapshot),
}

/// Creations and renames in `new` order, then deletions in `old` order.
pub fn emoji_diff(old: &[EmojiSnapshot], new: &[EmojiSnapshot]) -> Vec<EmojiChange> {
    let mut changes = vec![];

    for emoji in new {
        match old.iter().find(|previous| previous.id == emoji.id) {
            None => changes.push(EmojiChange::Created(emoji.clone())),
            Some(previous) if previous.name != emoji.name => {
                changes.push(EmojiChange::Renamed {
                    old_name: previous.name.clone(),
                    emoji: emoji.clone(),
                })
            }
            Some(_) => {}
        }
    }

    changes.extend(
        old.iter()
            .filter(|previous| !new.iter().any(|emoji| emoji.id == previous.id))
            .cloned()
            .map(EmojiChange::Deleted),
    );

    changes
}

fn emoji_notification(log: &LogContext<'_>, change: &EmojiChange) -> Notification {
    match change {
        EmojiChange::Created(emoji) => server_notification(
            log,
            Tone::Green,
            "log-emoji-create-title",
            &[line(log, "log-line-emoji", &[("emoji", emoji.markup())])],
        ),
        EmojiChange::Renamed { old_name, emoji } => server_notification(
            log,
            Tone::Yellow,
            "log-emoji-update-title",
            &[
                line(log, "log-line-emoji", &[("emoji", emoji.markup())]),
                line(log, "log-line-old-emoji-name", &[("name", old_name.clone())]),
            ],
        ),
        // A deleted emoji no longer renders, so only its name is shown.
        EmojiChange::Deleted(emoji) => server_notification(
            log,
            Tone::Red,
            "log-emoji-delete-title",
            &[line(log, "log-line-name", &[("name", format!(":{}:", emoji.name))])],
        ),
    }
}

/// `previous` is `None` the first time a guild's emoji set is seen.
pub async fn handle_emojis_update(
    log: &LogContext<'_>,
    previous: Option<&[EmojiSnapshot]>,
    current: &[EmojiSnapshot],
) -> Result<(), Error> {
    let Some(previous) = previous else {
        return Ok(());
    };

    for change in emoji_diff(previous, current) {
        if !log
            .send(LogChannel::ServerLog, emoji_notification(log, &change))
            .await?
        {
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
    use poise::serenity_prelude as serenity;

    fn emoji(id: u64, name: &str) -> EmojiSnapshot {
        EmojiSnapshot {
            id: serenity::EmojiId::new(id),
            name: name.to_string(),
            animated: false,
        }
    }

    #[test]
    fn test_diff_classifies_each_emoji() {
        let old = vec![emoji(1, "wave"), emoji(2, "cry"), emoji(3, "ok")];
        let new = vec![emoji(1, "wave"), emoji(2, "sob"), emoji(4, "party")];

        assert_eq!(
            emoji_diff(&old, &new),
            vec![
                EmojiChange::Renamed {
                    old_name: "cry".to_string(),
                    emoji: emoji(2, "sob")
                },
                EmojiChange::Created(emoji(4, "party")),
                EmojiChange::Deleted(emoji(3, "ok")),
            ]
        );
        assert!(emoji_diff(&old, &old).is_empty());
    }

    #[tokio::test]
    async fn test_first_sighting_only_seeds() {
        let notifier = RecordingNotifier::all();
        let audit = FakeAudit::default();
        let log = log_context(&notifier, &audit);

        handle_emojis_update(&log, None, &[emoji(1, "wave")]).await.unwrap();
        assert!(notifier.sent().is_empty());

        handle_emojis_update(&log, Some(&[][..]), &[emoji(1, "wave")]).await.unwrap();
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.title, "Emoji Created");
        assert_eq!(sent[0].1.description.as_deref(), Some("**Emoji:** <:wave:1>"));
    }
}

use super::{change, line, server_notification};
use crate::Error;
use crate::services::log_channels::LogChannel;
use crate::services::notification::Tone;
use crate::services::notifier::LogContext;
use crate::snapshot::RoleSnapshot;

fn hex(color: u32) -> String {
    format!("#{:06x}", color)
}

/// Name, color and permissions only; hoist, mentionable and position are ignored.
pub fn role_changes(log: &LogContext<'_>, old: &RoleSnapshot, new: &RoleSnapshot) -> Vec<String> {
    let mut changes = vec![];

    if old.name != new.name {
        changes.push(change(log, "log-change-name", old.name.clone(), new.name.clone()));
    }
    if old.color != new.color {
        changes.push(change(log, "log-change-color", hex(old.color), hex(new.color)));
    }
    if old.permissions != new.permissions {
        changes.push(log.t("log-change-permissions"));
    }

    changes
}

pub async fn handle_role_create(log: &LogContext<'_>, role: &RoleSnapshot) -> Result<(), Error> {
    let lines = [
        line(log, "log-line-role-name", &[("name", role.name.clone())]),
        line(log, "log-line-role-id", &[("id", role.id.to_string())]),
    ];
    log.send(
        LogChannel::ServerLog,
        server_notification(log, Tone::Green, "log-role-create-title", &lines),
    )
    .await?;
    Ok(())
}

pub async fn handle_role_update(
    log: &LogContext<'_>,
    old: Option<&RoleSnapshot>,
    new: &RoleSnapshot,
) -> Result<(), Error> {
    let Some(old) = old else {
        return Ok(());
    };
    let changes = role_changes(log, old, new);
    if changes.is_empty() {
        return Ok(());
    }

    log.send(
        LogChannel::ServerLog,
        server_notification(log, Tone::Orange, "log-role-update-title", &changes),
    )
    .await?;
    Ok(())
}

/// `name` is the role id when the deleted role was not cached.
pub async fn handle_role_delete(log: &LogContext<'_>, name: &str) -> Result<(), Error> {
    let lines = [line(log, "log-line-role", &[("name", name.to_string())])];
    log.send(
        LogChannel::ServerLog,
        server_notification(log, Tone::Red, "log-role-delete-title", &lines),
    )
    .await?;
    Ok(())
}

pub mod channels;
pub mod emojis;
pub mod events;
pub mod guild;
pub mod roles;

use crate::modules::{Module, ModuleDefinition};
use crate::services::log_channels::LogChannel;
use crate::services::notification::{Notification, Tone};
use crate::services::notifier::LogContext;
use fluent::FluentArgs;

pub fn module() -> Module {
    Module {
        definition: ModuleDefinition {
            id: "server_log",
            name_key: "module-server-log-name",
            description_key: "module-server-log-desc",
            log_channel: LogChannel::ServerLog,
        },
        event_handlers: vec![events::handler],
    }
}

/// One localized `**Label:** value` line of a server-log description.
pub(crate) fn line(log: &LogContext<'_>, key: &str, args: &[(&'static str, String)]) -> String {
    let mut fluent_args = FluentArgs::new();
    for (name, value) in args {
        fluent_args.set(*name, value.clone());
    }
    log.l10n.t(key, Some(&fluent_args))
}

/// `log-change-*` line for a field that went from `old` to `new`.
pub(crate) fn change(log: &LogContext<'_>, key: &str, old: String, new: String) -> String {
    line(log, key, &[("old", old), ("new", new)])
}

pub(crate) fn server_notification(
    log: &LogContext<'_>,
    tone: Tone,
    title_key: &str,
    lines: &[String],
) -> Notification {
    let notification = Notification::new(tone, log.t(title_key)).description(lines.join("\n"));
    log.guild_footer(notification, "log-footer-server")
}

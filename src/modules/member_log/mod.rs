pub mod changes;
pub mod events;
pub mod moderation;

use crate::modules::{Module, ModuleDefinition};
use crate::services::log_channels::LogChannel;
use poise::serenity_prelude as serenity;

pub fn module() -> Module {
    Module {
        definition: ModuleDefinition {
            id: "member_log",
            name_key: "module-member-log-name",
            description_key: "module-member-log-desc",
            log_channel: LogChannel::MemberLog,
        },
        event_handlers: vec![events::handler],
    }
}

/// `<@&id>` mentions joined with ", ", or the localized "None".
pub(crate) fn role_mentions(roles: &[serenity::RoleId], none: &str) -> String {
    if roles.is_empty() {
        return none.to_string();
    }
    roles
        .iter()
        .map(|role| format!("<@&{}>", role.get()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub mod member_log;
pub mod message_log;
pub mod server_log;
pub mod user_log;
pub mod voice_log;

use crate::services::log_channels::LogChannel;
use crate::{Data, Error};
use poise::serenity_prelude as serenity;

pub type EventHandler = for<'a> fn(
    &'a serenity::Context,
    &'a serenity::FullEvent,
    &'a Data,
) -> poise::BoxFuture<'a, Result<(), Error>>;

#[derive(Debug, Clone)]
pub struct ModuleDefinition {
    pub id: &'static str,
    pub name_key: &'static str,
    pub description_key: &'static str,
    pub log_channel: LogChannel,
}

pub struct Module {
    pub definition: ModuleDefinition,
    pub event_handlers: Vec<EventHandler>,
}

pub fn get_modules() -> Vec<Module> {
    vec![
        member_log::module(),
        message_log::module(),
        voice_log::module(),
        user_log::module(),
        server_log::module(),
    ]
}

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        crate::services::help::lohelp(),
        crate::services::setup::modsetup(),
    ]
}

pub fn definitions() -> Vec<ModuleDefinition> {
    get_modules().into_iter().map(|m| m.definition).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_log_channel_has_one_module() {
        let definitions = definitions();
        for channel in LogChannel::ALL {
            assert_eq!(
                definitions.iter().filter(|d| d.log_channel == channel).count(),
                1,
                "{}",
                channel.name()
            );
        }
    }
}

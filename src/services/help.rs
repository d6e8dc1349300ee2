use crate::modules::ModuleDefinition;
use crate::services::localization::{ContextL10nExt, L10nProxy};
use crate::services::notification::{Notification, Tone};
use crate::{Context, Error};

/// Lists what each log module records.
#[poise::command(slash_command)]
pub async fn lohelp(ctx: Context<'_>) -> Result<(), Error> {
    let l10n = ctx.l10n_user();
    let notification = help_notification(&l10n, &ctx.data().module_definitions);

    ctx.send(poise::CreateReply::default().embed(notification.to_embed()))
        .await?;

    Ok(())
}

pub fn help_notification(l10n: &L10nProxy, modules: &[ModuleDefinition]) -> Notification {
    let mut notification = Notification::new(Tone::Blue, l10n.t("help-title", None))
        .description(l10n.t("help-desc", None))
        .footer(l10n.t("help-footer", None), None)
        .without_timestamp();

    for module in modules {
        notification = notification.field(
            l10n.t(module.name_key, None),
            l10n.t(module.description_key, None),
            false,
        );
    }

    notification
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::localization::LocalizationManager;
    use std::sync::Arc;

    #[test]
    fn test_one_field_per_module() {
        let l10n = Arc::new(LocalizationManager::new()).get_proxy("en-US");
        let definitions = crate::modules::definitions();
        let help = help_notification(&l10n, &definitions);

        assert_eq!(help.fields.len(), definitions.len());
        assert_eq!(help.title, "📜 Bot Logging Duties");
        assert_eq!(
            help.field_value("Message Logs"),
            Some("Logs messages as they are sent, edited and deleted.")
        );
        assert!(!help.timestamped);
    }
}

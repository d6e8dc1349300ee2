use crate::services::localization::ContextL10nExt;
use crate::services::log_channels::{ChannelDirectory, LogChannel, LogChannelRegistry};
use crate::{Context, Error};
use fluent::FluentArgs;
use poise::serenity_prelude as serenity;
use tracing::{error, info};

pub const CATEGORY_NAME: &str = "Moderation";

/// Creates the Moderation category and the log channels that are missing.
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "MANAGE_CHANNELS"
)]
pub async fn modsetup(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };
    let l10n = ctx.l10n_user();
    let permissions = ctx
        .author_member()
        .await
        .and_then(|member| member.permissions);

    if !can_run_setup(permissions) {
        ctx.send(
            poise::CreateReply::default()
                .content(l10n.t("setup-no-permission", None))
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    ctx.defer_ephemeral().await?;

    let logger = &ctx.data().logger;
    let reply = match run_setup(logger.registry(), logger.gateway(), guild_id).await {
        Ok(created) => {
            info!("Setup finished in guild {}, {} channels created", guild_id, created);
            let mut args = FluentArgs::new();
            args.set("created", created);
            l10n.t("setup-complete", Some(&args))
        }
        Err(e) => {
            error!("Setup failed in guild {}: {:?}", guild_id, e);
            l10n.t("setup-failed", None)
        }
    };

    ctx.send(
        poise::CreateReply::default()
            .content(reply)
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

pub fn can_run_setup(permissions: Option<serenity::Permissions>) -> bool {
    permissions.is_some_and(|p| {
        p.contains(serenity::Permissions::MANAGE_CHANNELS)
            || p.contains(serenity::Permissions::ADMINISTRATOR)
    })
}

/// Provisions sequentially and returns how many channels were created. The
/// first failure aborts the remaining steps and leaves already created
/// channels in place. Callers check [`can_run_setup`] first.
pub async fn run_setup(
    registry: &LogChannelRegistry,
    directory: &dyn ChannelDirectory,
    guild_id: serenity::GuildId,
) -> Result<usize, Error> {
    let category = registry
        .ensure_category(directory, guild_id, CATEGORY_NAME)
        .await?;
    let mut created = usize::from(category.created);

    for kind in LogChannel::ALL {
        let channel = registry
            .ensure(directory, guild_id, category.id, kind)
            .await?;
        created += usize::from(channel.created);
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::log_channels::RoleEntry;
    use crate::services::log_channels::testing::{FakeDirectory, category, text};

    fn guild() -> serenity::GuildId {
        serenity::GuildId::new(1)
    }

    fn everyone() -> Vec<RoleEntry> {
        vec![RoleEntry {
            id: serenity::RoleId::new(1),
            position: 0,
        }]
    }

    #[test]
    fn test_without_permission_setup_is_refused() {
        assert!(!can_run_setup(None));
        assert!(!can_run_setup(Some(serenity::Permissions::SEND_MESSAGES)));
        assert!(!can_run_setup(Some(
            serenity::Permissions::MANAGE_ROLES | serenity::Permissions::KICK_MEMBERS
        )));
        assert!(can_run_setup(Some(serenity::Permissions::MANAGE_CHANNELS)));
    }

    #[tokio::test]
    async fn test_fresh_guild_gets_category_and_five_channels() {
        let directory = FakeDirectory::new(vec![], everyone());
        let registry = LogChannelRegistry::new();

        let outcome = run_setup(&registry, &directory, guild())
            .await
            .unwrap();

        assert_eq!(outcome, 6);
        let names: Vec<String> = directory.created().into_iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec!["Moderation", "member-log", "server-log", "voice-log", "msg-log", "user-log"]
        );
    }

    #[tokio::test]
    async fn test_existing_channels_are_reused_and_rerun_is_idempotent() {
        let directory = FakeDirectory::new(
            vec![category(2, "Moderation"), text(3, "msg-log"), text(4, "voice-log")],
            everyone(),
        );
        let registry = LogChannelRegistry::new();

        let first = run_setup(&registry, &directory, guild())
            .await
            .unwrap();
        assert_eq!(first, 3);

        let second = run_setup(&registry, &directory, guild())
            .await
            .unwrap();
        assert_eq!(second, 0);
        assert_eq!(directory.created().len(), 3);
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_steps() {
        let mut directory = FakeDirectory::new(vec![], everyone());
        directory.fail_after = Some(2);
        let registry = LogChannelRegistry::new();

        let result = run_setup(&registry, &directory, guild()).await;

        assert!(result.is_err());
        let names: Vec<String> = directory.created().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Moderation", "member-log"]);
    }

    #[test]
    fn test_administrator_may_run_setup() {
        assert!(can_run_setup(Some(serenity::Permissions::ADMINISTRATOR)));
        assert!(!can_run_setup(Some(serenity::Permissions::empty())));
    }
}

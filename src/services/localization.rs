use fluent::{FluentArgs, FluentResource};
use fluent_bundle::bundle::FluentBundle;
use include_dir::{Dir, include_dir};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};
use unic_langid::LanguageIdentifier;

// We use the concurrent memoizer to ensure thread safety (Sync + Send)
type ConcurrentBundle = FluentBundle<FluentResource, intl_memoizer::concurrent::IntlLangMemoizer>;

// Embed the locales directory at compile time
static LOCALES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/locales");

const FALLBACK_LOCALE: &str = "en-US";

#[derive(Debug, Deserialize)]
pub struct CommandLocale {
    pub name: Option<String>,
    pub desc: Option<String>,
}

pub struct LocalizationManager {
    bundles: HashMap<LanguageIdentifier, ConcurrentBundle>,
    command_locales: HashMap<LanguageIdentifier, HashMap<String, CommandLocale>>,
}

impl LocalizationManager {
    pub fn new() -> Self {
        let mut bundles = HashMap::new();
        let mut command_locales = HashMap::new();

        for entry in LOCALES_DIR.dirs() {
            let locale_name = entry.path().to_string_lossy();

            let Ok(lang_id) = locale_name.parse::<LanguageIdentifier>() else {
                error!("Skipping locale directory with invalid name: {}", locale_name);
                continue;
            };

            let mut bundle = ConcurrentBundle::new_concurrent(vec![lang_id.clone()]);
            // Log embeds render verbatim, bidi isolation marks would show up as noise.
            bundle.set_use_isolating(false);
            let mut commands = HashMap::new();

            for file in entry.files() {
                let path = file.path();
                let extension = path.extension().and_then(|e| e.to_str());
                let file_name = path.file_name().and_then(|n| n.to_str());

                if extension == Some("ftl") {
                    let Some(content) = file.contents_utf8() else {
                        continue;
                    };
                    match FluentResource::try_new(content.to_string()) {
                        Ok(resource) => {
                            if let Err(errors) = bundle.add_resource(resource) {
                                for err in errors {
                                    error!("Error adding resource for {}: {:?}", locale_name, err);
                                }
                            }
                        }
                        Err((_, errors)) => {
                            for err in errors {
                                error!("Error parsing resource for {}: {:?}", locale_name, err);
                            }
                        }
                    }
                } else if file_name == Some("commands.yaml") || file_name == Some("commands.yml") {
                    let Some(content) = file.contents_utf8() else {
                        continue;
                    };
                    match serde_yaml::from_str::<HashMap<String, CommandLocale>>(content) {
                        Ok(yaml_commands) => commands.extend(yaml_commands),
                        Err(err) => {
                            error!("Error parsing commands.yaml for {}: {:?}", locale_name, err);
                        }
                    }
                }
            }

            info!("Loaded embedded locale: {}", locale_name);
            bundles.insert(lang_id.clone(), bundle);
            command_locales.insert(lang_id, commands);
        }

        Self {
            bundles,
            command_locales,
        }
    }

    pub fn get_proxy(self: &Arc<Self>, locale: &str) -> L10nProxy {
        L10nProxy {
            manager: self.clone(),
            locale: locale.to_string(),
        }
    }

    fn format(&self, lang_id: &LanguageIdentifier, key: &str, args: Option<&FluentArgs>) -> Option<String> {
        let bundle = self.bundles.get(lang_id)?;
        let pattern = bundle.get_message(key)?.value()?;
        let mut errors = vec![];
        let text = bundle.format_pattern(pattern, args, &mut errors).into_owned();
        if !errors.is_empty() {
            error!("Errors formatting {} for {}: {:?}", key, lang_id, errors);
        }
        Some(text)
    }

    pub fn translate(&self, locale: &str, key: &str, args: Option<&FluentArgs>) -> String {
        let fallback: LanguageIdentifier = FALLBACK_LOCALE
            .parse()
            .unwrap_or_else(|_| LanguageIdentifier::default());
        let lang_id = locale
            .parse::<LanguageIdentifier>()
            .unwrap_or_else(|_| fallback.clone());

        // 1. Requested locale, 2. en-US, 3. the key itself
        self.format(&lang_id, key, args)
            .or_else(|| {
                if lang_id != fallback {
                    self.format(&fallback, key, args)
                } else {
                    None
                }
            })
            .unwrap_or_else(|| key.to_string())
    }

    pub fn apply_translations<U, E>(&self, commands: &mut [poise::Command<U, E>]) {
        for (lang_id, locales) in &self.command_locales {
            let locale_str = lang_id.to_string();

            for cmd in commands.iter_mut() {
                let Some(loc) = locales.get(&cmd.name) else {
                    continue;
                };

                if let Some(name) = &loc.name {
                    cmd.name_localizations
                        .insert(locale_str.clone(), name.clone());
                    if locale_str == FALLBACK_LOCALE {
                        cmd.name = name.clone();
                    }
                }
                if let Some(desc) = &loc.desc {
                    cmd.description_localizations
                        .insert(locale_str.clone(), desc.clone());
                    if locale_str == FALLBACK_LOCALE {
                        cmd.description = Some(desc.clone());
                    }
                }
            }
        }
    }
}

/// A proxy for translation that holds a reference to the manager and a specific locale
#[derive(Clone)]
pub struct L10nProxy {
    pub manager: Arc<LocalizationManager>,
    pub locale: String,
}

impl L10nProxy {
    pub fn t(&self, key: &str, args: Option<&FluentArgs>) -> String {
        self.manager.translate(&self.locale, key, args)
    }

    /// Shorthand for messages taking a single `$user` argument.
    pub fn t_user(&self, key: &str, user: &str) -> String {
        let mut args = FluentArgs::new();
        args.set("user", user.to_string());
        self.t(key, Some(&args))
    }
}

/// Helper trait to add localization to the Poise context
pub trait ContextL10nExt {
    fn l10n_user(&self) -> L10nProxy;
}

impl ContextL10nExt for crate::Context<'_> {
    fn l10n_user(&self) -> L10nProxy {
        let manager = self.data().l10n.clone();
        if let Some(locale) = self.locale() {
            return L10nProxy {
                manager,
                locale: locale.to_string(),
            };
        }

        let guild_locale = self.guild().map(|guild| guild.preferred_locale.clone());
        L10nProxy {
            manager,
            locale: guild_locale.unwrap_or_else(|| FALLBACK_LOCALE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy(locale: &str) -> L10nProxy {
        Arc::new(LocalizationManager::new()).get_proxy(locale)
    }

    #[test]
    fn test_translate_with_args() {
        let l10n = proxy("en-US");
        assert_eq!(
            l10n.t_user("log-member-ban-desc", "someone"),
            "**someone** has been banned."
        );
    }

    #[test]
    fn test_unknown_locale_falls_back_to_en_us() {
        let l10n = proxy("fr");
        assert_eq!(l10n.t("log-field-user-id", None), "User ID");
    }

    #[test]
    fn test_missing_key_returns_key() {
        let l10n = proxy("en-US");
        assert_eq!(l10n.t("does-not-exist", None), "does-not-exist");
    }

    #[test]
    fn test_command_descriptions_are_applied() {
        let manager = LocalizationManager::new();
        let mut commands = crate::modules::commands();
        manager.apply_translations(&mut commands);

        let setup = commands
            .iter()
            .find(|c| c.name == "modsetup")
            .expect("modsetup registered");
        assert_eq!(
            setup.description.as_deref(),
            Some("Creates a Moderation category with the log channels.")
        );
    }
}

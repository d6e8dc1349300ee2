use poise::serenity_prelude as serenity;

/// Embed accent colors, matching the palette moderators know from other bots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Blue,
    Green,
    Red,
    Orange,
    Purple,
    Yellow,
}

impl Tone {
    pub fn color(&self) -> u32 {
        match self {
            Tone::Blue => 0x3498db,
            Tone::Green => 0x57f287,
            Tone::Red => 0xed4245,
            Tone::Orange => 0xe67e22,
            Tone::Purple => 0x9b59b6,
            Tone::Yellow => 0xfee75c,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    pub text: String,
    pub icon_url: Option<String>,
}

/// A structured log message, built fresh for each event and rendered as an embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub tone: Tone,
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<Field>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub footer: Option<Footer>,
    pub timestamped: bool,
}

impl Notification {
    pub fn new(tone: Tone, title: impl Into<String>) -> Self {
        Self {
            tone,
            title: title.into(),
            description: None,
            fields: vec![],
            image: None,
            thumbnail: None,
            footer: None,
            timestamped: true,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    pub fn footer(mut self, text: impl Into<String>, icon_url: Option<String>) -> Self {
        self.footer = Some(Footer {
            text: text.into(),
            icon_url,
        });
        self
    }

    pub fn without_timestamp(mut self) -> Self {
        self.timestamped = false;
        self
    }

    /// Value of the first field with the given name.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }

    pub fn to_embed(&self) -> serenity::CreateEmbed {
        let mut embed = serenity::CreateEmbed::new()
            .title(self.title.as_str())
            .colour(self.tone.color());

        if let Some(description) = &self.description {
            embed = embed.description(description.as_str());
        }
        for field in &self.fields {
            embed = embed.field(field.name.as_str(), field.value.as_str(), field.inline);
        }
        if let Some(image) = &self.image {
            embed = embed.image(image.as_str());
        }
        if let Some(thumbnail) = &self.thumbnail {
            embed = embed.thumbnail(thumbnail.as_str());
        }
        if let Some(footer) = &self.footer {
            let mut builder = serenity::CreateEmbedFooter::new(footer.text.as_str());
            if let Some(icon_url) = &footer.icon_url {
                builder = builder.icon_url(icon_url.as_str());
            }
            embed = embed.footer(builder);
        }
        if self.timestamped {
            embed = embed.timestamp(serenity::Timestamp::now());
        }

        embed
    }
}

//! Best-effort attribution of moderation actions through the audit log.
//!
//! Gateway events for bans and member removals carry no moderator or reason,
//! so the most recent audit entry of the matching action is fetched and
//! correlated with the affected user. There is no ordering guarantee between
//! the gateway event and the entry becoming visible, and concurrent actions
//! can interleave, so an attribution is an annotation, never a fact. Missed
//! kicks (false negatives) are expected under concurrent moderation.

use crate::Error;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use ::serenity::model::guild::audit_log::{Action, AuditLogEntry, MemberAction};
use tracing::warn;

/// How old the latest kick entry may be and still describe the current removal.
pub const KICK_MATCH_WINDOW_SECS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Ban,
    Kick,
}

impl From<AuditAction> for Action {
    fn from(action: AuditAction) -> Self {
        match action {
            AuditAction::Ban => Action::Member(MemberAction::BanAdd),
            AuditAction::Kick => Action::Member(MemberAction::Kick),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub target_id: Option<serenity::UserId>,
    pub reason: Option<String>,
    /// Unix seconds.
    pub created_at: i64,
}

impl From<AuditLogEntry> for AuditRecord {
    fn from(entry: AuditLogEntry) -> Self {
        Self {
            target_id: entry
                .target_id
                .map(|target| serenity::UserId::new(target.get())),
            reason: entry.reason,
            created_at: entry.id.created_at().unix_timestamp(),
        }
    }
}

/// Read access to a guild's audit log.
#[async_trait]
pub trait AuditTrail: Send + Sync {
    /// The single most recent entry of `action`, if any.
    async fn latest(
        &self,
        guild_id: serenity::GuildId,
        action: AuditAction,
    ) -> Result<Option<AuditRecord>, Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    /// The latest entry targets the affected user.
    Confirmed,
    /// No entry, a foreign target, or an unreadable audit log.
    Unverified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribution {
    Matched { reason: Option<String>, age_secs: i64 },
    Mismatched { reason: Option<String> },
    Missing,
    Unavailable,
}

impl Attribution {
    pub fn confidence(&self) -> Confidence {
        match self {
            Attribution::Matched { .. } => Confidence::Confirmed,
            _ => Confidence::Unverified,
        }
    }

    /// The reason recorded on the entry, whether or not it matched.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Attribution::Matched { reason, .. } | Attribution::Mismatched { reason } => {
                reason.as_deref()
            }
            Attribution::Missing | Attribution::Unavailable => None,
        }
    }

    pub fn has_entry(&self) -> bool {
        matches!(self, Attribution::Matched { .. } | Attribution::Mismatched { .. })
    }
}

/// Correlates the latest `action` entry with `user_id`. `now` is unix seconds.
pub async fn attribute(
    trail: &dyn AuditTrail,
    guild_id: serenity::GuildId,
    action: AuditAction,
    user_id: serenity::UserId,
    now: i64,
) -> Attribution {
    match trail.latest(guild_id, action).await {
        Ok(Some(record)) if record.target_id == Some(user_id) => Attribution::Matched {
            reason: record.reason,
            age_secs: now - record.created_at,
        },
        Ok(Some(record)) => Attribution::Mismatched {
            reason: record.reason,
        },
        Ok(None) => Attribution::Missing,
        Err(e) => {
            warn!(
                "Audit log unavailable in guild {} for {:?}: {:?}",
                guild_id, action, e
            );
            Attribution::Unavailable
        }
    }
}

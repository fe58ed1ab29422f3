//! Managed guild filtering and card derivation

use serde::Serialize;

use crate::api::{GuildSummary, User};

/// Discord `ADMINISTRATOR` permission bit
pub const ADMINISTRATOR: u64 = 0x8;

/// Discord `MANAGE_GUILD` permission bit
pub const MANAGE_GUILD: u64 = 0x20;

const CDN_BASE: &str = "https://cdn.discordapp.com";

/// Avatar shown for users and guilds without a custom image
pub const FALLBACK_AVATAR_URL: &str = "https://cdn.discordapp.com/embed/avatars/0.png";

/// Tag of a guild the bot has joined
pub const TAG_ACTIVE: &str = "ACTIVE";

/// Tag of a guild that still needs the bot invited
pub const TAG_INVITE_REQUIRED: &str = "INVITE REQUIRED";

/// Text rendered when the user manages no guild
pub const EMPTY_GUILDS_TEXT: &str = "No managed servers found.";

/// Whether a permission bitmask grants administrator or manage-guild
///
/// # Examples
///
/// ```
/// use guild_dashboard::dashboard::guilds::is_managed;
///
/// assert!(is_managed(0x8));
/// assert!(is_managed(0x20));
/// assert!(!is_managed(0x10));
/// ```
pub fn is_managed(permissions: u64) -> bool {
    permissions & ADMINISTRATOR != 0 || permissions & MANAGE_GUILD != 0
}

/// Guilds the user may configure, in snapshot order
pub fn managed_guilds(guilds: &[GuildSummary]) -> Vec<&GuildSummary> {
    guilds.iter().filter(|g| is_managed(g.permissions)).collect()
}

/// CDN URL of a user's avatar
pub fn avatar_url(user: &User) -> String {
    match user.avatar.as_deref().filter(|hash| !hash.is_empty()) {
        Some(hash) => format!("{}/avatars/{}/{}.png", CDN_BASE, user.id, hash),
        None => FALLBACK_AVATAR_URL.to_string(),
    }
}

/// CDN URL of a guild's icon
pub fn icon_url(guild: &GuildSummary) -> String {
    match guild.icon.as_deref().filter(|hash| !hash.is_empty()) {
        Some(hash) => format!("{}/icons/{}/{}.png", CDN_BASE, guild.id, hash),
        None => FALLBACK_AVATAR_URL.to_string(),
    }
}

/// One entry of the servers grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildCard {
    pub id: String,
    pub name: String,
    pub icon_url: String,
    pub bot_present: bool,
}

impl GuildCard {
    /// Derive the card of a guild
    pub fn from_guild(guild: &GuildSummary) -> Self {
        Self {
            id: guild.id.clone(),
            name: guild.name.clone(),
            icon_url: icon_url(guild),
            bot_present: guild.bot_present,
        }
    }

    /// `ACTIVE` or `INVITE REQUIRED`
    pub fn tag(&self) -> &'static str {
        if self.bot_present {
            TAG_ACTIVE
        } else {
            TAG_INVITE_REQUIRED
        }
    }
}

/// Cards of every managed guild
pub fn guild_cards(guilds: &[GuildSummary]) -> Vec<GuildCard> {
    managed_guilds(guilds)
        .into_iter()
        .map(GuildCard::from_guild)
        .collect()
}

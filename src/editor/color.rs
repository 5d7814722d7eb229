//! Embed color palette
//!
//! Drafts store a palette token rather than a raw color value. Unknown tokens
//! are not rejected: [`EmbedColor::from_token`] maps them to
//! [`EmbedColor::Secondary`].

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Palette colors a draft embed can use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedColor {
    #[display("primary")]
    Primary,
    #[default]
    #[display("secondary")]
    Secondary,
    #[display("tertiary")]
    Tertiary,
    #[display("success")]
    Success,
    #[display("warning")]
    Warning,
    /// Blends into Discord's own embed background
    #[display("embed")]
    Embed,
}

impl EmbedColor {
    /// Every palette color, in the order shown to users
    pub const ALL: [Self; 6] = [
        Self::Primary,
        Self::Secondary,
        Self::Tertiary,
        Self::Success,
        Self::Warning,
        Self::Embed,
    ];

    /// Map a user supplied token to a palette color.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Anything outside the palette falls back to [`EmbedColor::Secondary`].
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|color| color.to_string().eq_ignore_ascii_case(token))
            .unwrap_or(Self::Secondary)
    }

    /// RGB value sent to Discord
    #[must_use]
    pub const fn rgb(self) -> u32 {
        match self {
            Self::Primary => 0x5865_F2,
            Self::Secondary => 0x4F54_5C,
            Self::Tertiary => 0x99AA_B5,
            Self::Success => 0x57F2_87,
            Self::Warning => 0xFEE7_5C,
            Self::Embed => 0x2B2D_31,
        }
    }

    /// Placeholder text listing the accepted tokens
    #[must_use]
    pub fn token_hint() -> String {
        let tokens: Vec<String> = Self::ALL.iter().map(ToString::to_string).collect();
        format!("Enter embed color ({})", tokens.join(", "))
    }
}

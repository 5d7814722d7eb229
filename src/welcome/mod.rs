//! Welcome and leave messages
//!
//! Guild admins edit the settings through [`WelcomePanel`]; member events
//! are answered by [`deliver`] through a channel webhook.

mod delivery;
mod panel;
mod settings;
mod variables;

pub use delivery::{DeliveryFacts, PreparedDelivery, deliver, prepare};
pub use panel::{
    Submission, WELCOME_FIELD, WelcomeAction, WelcomePanel, WelcomeRepository, message_surface,
    panel_surface,
};
pub use settings::{WelcomeKind, WelcomeSettings};
pub use variables::{GuildFacts, UserFacts, Variables, member_variable_help};

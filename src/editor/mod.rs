//! Session-keyed draft editor
//!
//! Drafts live in a [`DraftStore`] keyed by [`SessionKey`] and are edited
//! through component interactions whose custom ids carry the session. The
//! same pieces drive the `/message` composer and the welcome settings panel.

pub mod color;
pub mod composer;
pub mod custom_id;
mod draft;
mod error;
pub mod image;
pub mod sink;
pub mod store;
pub mod surface;
pub mod ui;

pub use color::EmbedColor;
pub use composer::{ComposerAction, MessageComposer};
pub use custom_id::{ComponentId, ComponentKind, Scope, SessionKey};
pub use draft::{CONTENT_MAX_LENGTH, Draft, parse_flag};
pub use error::{CustomIdError, EditorError, EditorResult};
pub use image::{ImageContext, ImageResolver};
pub use sink::{ChannelSink, OutgoingMessage, SendSink, WebhookSink};
pub use store::{DraftStore, EvictionPolicy};
pub use surface::{ControlSurface, DraftField, EditorReply, InputSurface, ModalValues, Notice};

//! Views: what the 8×8 pad grid does
//!
//! One view is active at a time, independent of the active mode. Views that
//! play notes also expose [`NoteInput`] so the octave buttons can reach them
//! without the controller knowing which view that is.

mod color;
mod play;
mod session;

pub use color::{ColorView, PALETTE};
pub use play::PlayView;
pub use session::SessionView;

use crate::context::{Context, RenderContext};
use crate::dispatch::{Dispatcher, Lifecycle};
use crate::registry::RegistryError;
use crate::types::Color;
use serde::{Deserialize, Serialize};

/// Identity of a view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewId {
    /// Chromatic note grid
    Play,
    /// Clip launcher grid
    Session,
    /// Track colour picker (transient)
    Color,
}

/// Octave shifting for note-playing views
pub trait NoteInput {
    /// Returns false when already at the top
    fn octave_up(&mut self) -> bool;
    /// Returns false when already at the bottom
    fn octave_down(&mut self) -> bool;
    fn octave(&self) -> i8;
}

/// A pad grid view
pub trait View: Lifecycle {
    fn id(&self) -> ViewId;

    /// Pad hit (velocity 0 = release); index 0 is bottom left
    fn on_pad(&mut self, index: usize, velocity: u8, ctx: &mut Context<'_>);

    /// Pure colour of one pad
    fn pad_color(&self, index: usize, ctx: &RenderContext<'_>) -> Color;

    fn as_note_input(&mut self) -> Option<&mut dyn NoteInput> {
        None
    }
}

/// Register every built-in view
pub fn register_views(views: &mut Dispatcher<ViewId, dyn View>) -> Result<(), RegistryError> {
    views.register(ViewId::Play, Box::new(PlayView::new()))?;
    views.register(ViewId::Session, Box::new(SessionView::new()))?;
    views.register(ViewId::Color, Box::new(ColorView::new()))?;
    Ok(())
}

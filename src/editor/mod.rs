//! The editing state machine, overlay georeferencing, and the adapter that
//! mirrors editor state onto a render surface.

mod event;
mod machine;
pub mod overlay;
mod state;
pub mod surface;

pub use event::EditorEvent;
pub use machine::{EditorStateMachine, Transition, transition};
pub use overlay::{OverlayGeoreferencer, Quad};
pub use state::{DrawMode, EditorState, OverlayConfig, Shape};
pub use surface::{DerivedLayers, Highlight, LayerKind, RenderSurface, SurfaceAdapter};

mod component;
mod render;
mod state;
pub mod viewport;

pub use component::NetworkMap;

//! Layered DAG view: layout, incremental updates, viewport and pointer
//! interaction, drawn to a canvas.

pub mod arena;
pub mod coalesce;
mod component;
pub mod diff;
pub mod interaction;
pub mod layout;
mod render;
pub mod state;
pub mod store;
pub mod types;
pub mod viewport;

pub use component::{DagHandle, DagView};
pub use state::{DagConfig, DagState};
pub use types::{DagEvent, EdgeSpec, NodeSpec, Orientation, Selection};

//! Review-dashboard annotation engine: image-space markup, pan/zoom
//! coordinate conversion, hit-testing, persistence and raster export.

mod canvas;
mod colour;
mod drawing;
mod export;
mod persistence;
mod shape;
mod view_transform;

pub use canvas::*;
pub use colour::*;
pub use drawing::*;
pub use export::*;
pub use persistence::*;
pub use shape::*;
pub use view_transform::*;

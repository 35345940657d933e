mod errors;
mod inference_device;
mod inspection_frame;
mod model_config;
mod part_box;
mod part_detection;
mod vocabulary;

pub use errors::*;
pub use inference_device::*;
pub use inspection_frame::*;
pub use model_config::*;
pub use part_box::*;
pub use part_detection::*;
pub use vocabulary::*;

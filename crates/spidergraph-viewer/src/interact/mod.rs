pub mod lod;
pub mod tap;

pub use lod::{LodConfig, LodController};
pub use tap::{Clock, SystemClock, TapConfig, TapDecision, TapTracker};

pub mod camera;
pub mod canvas;
pub mod picking;

pub use camera::{fit_on_rebuild, pan_camera, setup_camera, sync_canvas, zoom_camera};
pub use canvas::draw_graph;
pub use picking::{hover_detection, pointer_input};

pub mod bootstrap;
pub mod hierarchy;
pub mod importance;
pub mod label;
pub mod layout;
pub mod model;
pub mod nav;
pub mod normalize;
pub mod sim;
pub mod state;
pub mod view;

pub use layout::step_layout;
pub use state::GraphState;

pub mod help;
pub mod hud;
pub mod layout;
pub mod panel;
pub mod search;
pub mod settings;
pub mod shortcuts;
pub mod toasts;
pub mod tooltips;

pub use help::help_overlay;
pub use hud::hud_overlay;
pub use layout::UiLayout;
pub use panel::ui_panel;
pub use search::search_overlay;
pub use settings::settings_window;
pub use shortcuts::handle_shortcuts;
pub use toasts::toast_overlay;

pub const PANEL_W: f32 = 280.0;
pub const HUD_EDGE_PADDING: f32 = 8.0;
pub const HUD_PANEL_GAP: f32 = 12.0;

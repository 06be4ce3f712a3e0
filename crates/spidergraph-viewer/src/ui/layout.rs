use bevy::prelude::Resource;
use bevy_egui::egui;

/// Screen areas claimed by the side panel, refreshed every frame.
#[derive(Resource, Clone, Copy)]
pub struct UiLayout {
    pub panel_rect: egui::Rect,
    /// What is left for the graph canvas.
    pub content_rect: egui::Rect,
}

impl Default for UiLayout {
    fn default() -> Self {
        Self {
            panel_rect: egui::Rect::NOTHING,
            content_rect: egui::Rect::NOTHING,
        }
    }
}

impl UiLayout {
    /// Content area, or the whole screen before the first panel pass.
    pub fn content_or(&self, screen: egui::Rect) -> egui::Rect {
        if self.content_rect == egui::Rect::NOTHING {
            screen
        } else {
            self.content_rect
        }
    }
}

use bevy_egui::egui;

/// Floating box at `pos`. The first line is the title.
pub fn render_tooltip(ctx: &egui::Context, id: &str, pos: egui::Pos2, lines: Vec<String>) {
    let mut lines = lines.into_iter();
    let Some(title) = lines.next() else {
        return;
    };
    egui::Area::new(egui::Id::new(id))
        .order(egui::Order::Tooltip)
        .fixed_pos(pos)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.strong(title);
                for line in lines {
                    ui.label(line);
                }
            });
        });
}

//! Simulation log display

use eframe::egui;

/// Show the log lines. Returns `true` if "Clear" was pressed.
pub fn render_log_panel(ui: &mut egui::Ui, lines: &[String]) -> bool {
    let mut clear = false;

    ui.horizontal(|ui| {
        ui.heading("Log");
        ui.label(egui::RichText::new(format!("{} entries", lines.len())).weak());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.add_enabled(!lines.is_empty(), egui::Button::new("Clear")).clicked() {
                clear = true;
            }
        });
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            if lines.is_empty() {
                ui.label(egui::RichText::new("No output yet").italics().weak());
            }
            for line in lines {
                ui.label(egui::RichText::new(line).monospace());
            }
        });

    clear
}

//! Run / Stop / Draw Model / Reset buttons

use eframe::egui;

/// A button the operator pressed this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunCommand {
    Run,
    Stop,
    DrawModel,
    Reset,
}

pub fn render_run_bar(ui: &mut egui::Ui, is_running: bool, has_restart_file: bool) -> Option<RunCommand> {
    let mut command = None;

    ui.horizontal(|ui| {
        if is_running {
            if ui
                .button(egui::RichText::new("⏹ Stop").color(egui::Color32::LIGHT_RED))
                .clicked()
            {
                command = Some(RunCommand::Stop);
            }
            ui.spinner();
        } else if ui
            .button(egui::RichText::new("▶ Run").color(egui::Color32::LIGHT_GREEN))
            .clicked()
        {
            command = Some(RunCommand::Run);
        }

        if ui
            .add_enabled(has_restart_file, egui::Button::new("Draw Model"))
            .on_hover_text("Load the particle state from the restart file")
            .on_disabled_hover_text("Set a restart file first")
            .clicked()
        {
            command = Some(RunCommand::DrawModel);
        }

        if ui
            .button("Reset")
            .on_hover_text("Restore default parameters and clear the log")
            .clicked()
        {
            command = Some(RunCommand::Reset);
        }
    });

    command
}

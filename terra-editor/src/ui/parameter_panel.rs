//! UI panel for simulation parameters
//!
//! Widgets edit copies of the stored values and turn changes into
//! [`Action`]s. A rejected value never reaches the store; its message is
//! kept next to the field until the field is set successfully.

use eframe::egui;
use std::collections::HashMap;
use std::path::PathBuf;

use terra::config::ConfigField;
use terra::{Action, BoundaryCondition, SimConfig, SphPatch, Store, TimeSteppingPatch};

/// Inline validation messages keyed by field.
#[derive(Clone, Debug, Default)]
pub struct FieldErrors {
    messages: HashMap<ConfigField, String>,
}

impl FieldErrors {
    pub fn get(&self, field: ConfigField) -> Option<&str> {
        self.messages.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Dispatch each action through validation and record the outcome.
    /// Returns how many actions were applied.
    pub fn apply(&mut self, store: &mut Store, actions: Vec<Action>) -> usize {
        let mut applied = 0;
        for action in actions {
            let fields = touched_fields(&action);
            match store.try_dispatch(action) {
                Ok(()) => {
                    for field in fields {
                        self.messages.remove(field);
                    }
                    applied += 1;
                }
                Err(err) => {
                    log::debug!("Rejected edit: {err}");
                    self.messages.insert(err.field, err.to_string());
                }
            }
        }
        applied
    }
}

fn touched_fields(action: &Action) -> &'static [ConfigField] {
    use ConfigField::*;
    match action {
        Action::SetMaxN(_) => &[MaxN, MonitorParticle],
        Action::SetMaxNearN(_) => &[MaxNearN],
        Action::SetModelScale(_) => &[Length, Width, Height],
        Action::SetBcPattern(_) | Action::SetULid(_) => &[ULid],
        Action::SetSphParams(_) => &[SmoothLength, CellScale, Beta, CsRate],
        Action::SetResolution(_) => &[Dx, Dy, Dz],
        Action::SetTimeStepping(_) => &[Dt, OutStep, MaxStep],
        Action::SetMonitorParticle(_) => &[MonitorParticle],
        Action::SetRestartFile(_) => &[RestartFile],
        Action::SetOutFile(_) => &[OutFile],
        Action::LoadConfig(_) | Action::ResetToDefault => &[
            MaxN, MaxNearN, Length, Width, Height, ULid, SmoothLength, CellScale, Beta, CsRate,
            Dx, Dy, Dz, Dt, OutStep, MaxStep, RestartFile, OutFile, MonitorParticle,
        ],
        _ => &[],
    }
}

/// Parameter editor state that must survive between frames.
#[derive(Debug, Default)]
pub struct ParameterPanel {
    pub errors: FieldErrors,
    restart_text: String,
    out_text: String,
    /// Path values the text buffers were last synced from.
    synced: Option<(Option<PathBuf>, PathBuf)>,
}

impl ParameterPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the panel. Returns the edits made this frame.
    ///
    /// Editing stays possible during a run; the solver keeps the document it
    /// was started with.
    pub fn show(&mut self, ui: &mut egui::Ui, config: &SimConfig) -> Vec<Action> {
        self.sync_paths(config);
        let mut actions = Vec::new();

        egui::CollapsingHeader::new("Particles")
            .default_open(true)
            .show(ui, |ui| self.particles_section(ui, config, &mut actions));
        egui::CollapsingHeader::new("Model")
            .default_open(true)
            .show(ui, |ui| self.model_section(ui, config, &mut actions));
        egui::CollapsingHeader::new("SPH")
            .default_open(false)
            .show(ui, |ui| self.sph_section(ui, config, &mut actions));
        egui::CollapsingHeader::new("Time Stepping")
            .default_open(true)
            .show(ui, |ui| self.time_section(ui, config, &mut actions));
        egui::CollapsingHeader::new("Files")
            .default_open(true)
            .show(ui, |ui| self.files_section(ui, &mut actions));

        actions
    }

    fn sync_paths(&mut self, config: &SimConfig) {
        let current = (config.restart_file.clone(), config.out_file.clone());
        if self.synced.as_ref() == Some(&current) {
            return;
        }
        self.restart_text = config
            .restart_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        self.out_text = config.out_file.display().to_string();
        self.synced = Some(current);
    }

    fn particles_section(&self, ui: &mut egui::Ui, config: &SimConfig, actions: &mut Vec<Action>) {
        if let Some(n) = count_field(ui, &self.errors, ConfigField::MaxN, config.max_n) {
            actions.push(Action::SetMaxN(n));
        }
        if let Some(n) = count_field(ui, &self.errors, ConfigField::MaxNearN, config.max_near_n) {
            actions.push(Action::SetMaxNearN(n));
        }
        if let Some(index) = count_field(ui, &self.errors, ConfigField::MonitorParticle, config.monitor_particle) {
            actions.push(Action::SetMonitorParticle(index));
        }
    }

    fn model_section(&self, ui: &mut egui::Ui, config: &SimConfig, actions: &mut Vec<Action>) {
        let mut scale = config.model_scale;
        let mut changed = false;
        changed |= float_field(ui, &self.errors, ConfigField::Length, &mut scale.length, 0.01);
        changed |= float_field(ui, &self.errors, ConfigField::Width, &mut scale.width, 0.01);
        changed |= float_field(ui, &self.errors, ConfigField::Height, &mut scale.height, 0.01);
        if changed {
            actions.push(Action::SetModelScale(scale));
        }

        let mut dx = config.dx;
        let mut changed = false;
        changed |= float_field(ui, &self.errors, ConfigField::Dx, &mut dx.dx, 0.001);
        changed |= float_field(ui, &self.errors, ConfigField::Dy, &mut dx.dy, 0.001);
        changed |= float_field(ui, &self.errors, ConfigField::Dz, &mut dx.dz, 0.001);
        if changed {
            actions.push(Action::SetResolution(dx));
        }

        ui.add_space(4.0);
        egui::ComboBox::from_label("Boundary")
            .selected_text(config.bc_pattern.name())
            .show_ui(ui, |ui| {
                for bc in BoundaryCondition::ALL {
                    if ui
                        .selectable_label(config.bc_pattern == bc, bc.name())
                        .clicked()
                        && bc != config.bc_pattern
                    {
                        actions.push(Action::SetBcPattern(bc));
                    }
                }
            });

        ui.add_enabled_ui(config.bc_pattern.is_lid_driven(), |ui| {
            let mut u_lid = config.u_lid;
            if float_field(ui, &self.errors, ConfigField::ULid, &mut u_lid, 0.01) {
                actions.push(Action::SetULid(u_lid));
            }
        });
    }

    fn sph_section(&self, ui: &mut egui::Ui, config: &SimConfig, actions: &mut Vec<Action>) {
        let mut patch = SphPatch::default();
        let mut value = config.smooth_length;
        if float_field(ui, &self.errors, ConfigField::SmoothLength, &mut value, 0.001) {
            patch.smooth_length = Some(value);
        }
        let mut value = config.cell_scale;
        if float_field(ui, &self.errors, ConfigField::CellScale, &mut value, 0.01) {
            patch.cell_scale = Some(value);
        }
        let mut value = config.beta;
        if float_field(ui, &self.errors, ConfigField::Beta, &mut value, 0.01) {
            patch.beta = Some(value);
        }
        let mut value = config.cs_rate;
        if float_field(ui, &self.errors, ConfigField::CsRate, &mut value, 0.001) {
            patch.cs_rate = Some(value);
        }
        if patch != SphPatch::default() {
            actions.push(Action::SetSphParams(patch));
        }
    }

    fn time_section(&self, ui: &mut egui::Ui, config: &SimConfig, actions: &mut Vec<Action>) {
        let mut patch = TimeSteppingPatch::default();
        let mut dt = config.dt;
        if float_field(ui, &self.errors, ConfigField::Dt, &mut dt, 0.0001) {
            patch.dt = Some(dt);
        }
        patch.out_step = count_field(ui, &self.errors, ConfigField::OutStep, config.out_step);
        patch.max_step = count_field(ui, &self.errors, ConfigField::MaxStep, config.max_step);
        if patch != TimeSteppingPatch::default() {
            actions.push(Action::SetTimeStepping(patch));
        }
    }

    fn files_section(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            ui.label("Restart file:");
            if ui.text_edit_singleline(&mut self.restart_text).changed() {
                actions.push(Action::SetRestartFile(Some(PathBuf::from(&self.restart_text))));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                if ui.button("…").on_hover_text("Browse").clicked() {
                    if let Some(path) = rfd::FileDialog::new().pick_file() {
                        self.restart_text = path.display().to_string();
                        actions.push(Action::SetRestartFile(Some(path)));
                    }
                }
            }
        });
        error_label(ui, &self.errors, ConfigField::RestartFile);

        ui.horizontal(|ui| {
            ui.label("Output file:");
            if ui.text_edit_singleline(&mut self.out_text).changed() {
                actions.push(Action::SetOutFile(PathBuf::from(&self.out_text)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                if ui.button("…").on_hover_text("Browse").clicked() {
                    if let Some(path) = rfd::FileDialog::new().save_file() {
                        self.out_text = path.display().to_string();
                        actions.push(Action::SetOutFile(path));
                    }
                }
            }
        });
        error_label(ui, &self.errors, ConfigField::OutFile);
    }
}

fn error_label(ui: &mut egui::Ui, errors: &FieldErrors, field: ConfigField) {
    if let Some(message) = errors.get(field) {
        ui.label(
            egui::RichText::new(message)
                .small()
                .color(egui::Color32::LIGHT_RED),
        );
    }
}

fn float_field(ui: &mut egui::Ui, errors: &FieldErrors, field: ConfigField, value: &mut f64, speed: f64) -> bool {
    let changed = ui
        .horizontal(|ui| {
            ui.label(format!("{}:", field.label()));
            ui.add(egui::DragValue::new(value).speed(speed).max_decimals(6))
                .changed()
        })
        .inner;
    error_label(ui, errors, field);
    changed
}

fn count_field(ui: &mut egui::Ui, errors: &FieldErrors, field: ConfigField, current: usize) -> Option<usize> {
    let mut value = current;
    let changed = ui
        .horizontal(|ui| {
            ui.label(format!("{}:", field.label()));
            ui.add(egui::DragValue::new(&mut value).speed(1.0)).changed()
        })
        .inner;
    error_label(ui, errors, field);
    changed.then_some(value)
}

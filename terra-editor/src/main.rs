//! Terra Editor
//!
//! Desktop front end: edit simulation parameters, preview the particle
//! lattice, run the external solver and inspect its result.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use eframe::egui;

use terra::prelude::*;
use terra_editor::settings::{load_config, SolverSettings};
use terra_editor::ui::{render_log_panel, render_run_bar, ParameterPanel, RunCommand};
use terra_editor::{logging, EmbeddedViewport};

/// How long a status notice stays visible.
const STATUS_SECONDS: u64 = 5;

#[derive(Parser, Debug)]
#[command(name = "terra-editor", version, about = "Particle simulation editor")]
struct Cli {
    /// Configuration file to open at startup.
    config: Option<PathBuf>,

    #[command(flatten)]
    settings: SolverSettings,
}

/// Which sidebar tab is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SidebarTab {
    #[default]
    Parameters,
    Log,
}

fn main() -> eframe::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.settings.log_level.as_deref());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Terra Editor"),
        // Use wgpu renderer for custom painting
        renderer: eframe::Renderer::Wgpu,
        wgpu_options: eframe::egui_wgpu::WgpuConfiguration::default(),
        ..Default::default()
    };

    eframe::run_native(
        "Terra Editor",
        options,
        Box::new(|cc| Ok(Box::new(EditorApp::new(cc, cli)))),
    )
}

struct EditorApp {
    store: Store,
    pipeline: LogPipeline,
    controller: RunController,
    solver: ProcessSolver,
    loader: SnapshotLoader,
    viewport: EmbeddedViewport,
    parameters: ParameterPanel,
    selected_tab: SidebarTab,
    current_file: Option<PathBuf>,
    status_message: Option<(String, Instant)>,
}

impl EditorApp {
    fn new(cc: &eframe::CreationContext<'_>, cli: Cli) -> Self {
        let bus = EventBus::new();
        // Attach before anything can run: events emitted earlier are lost.
        let pipeline = LogPipeline::attach(&bus);
        let controller = RunController::new(&bus);
        let solver = cli.settings.solver(&bus);

        let mut viewport = EmbeddedViewport::new();
        if let Some(ref wgpu_render_state) = cc.wgpu_render_state {
            viewport.initialize(wgpu_render_state);
        }

        let mut app = Self {
            store: Store::new(),
            pipeline,
            controller,
            solver,
            loader: SnapshotLoader::spawn(),
            viewport,
            parameters: ParameterPanel::new(),
            selected_tab: SidebarTab::default(),
            current_file: None,
            status_message: None,
        };

        if let Some(path) = cli.config {
            match load_config(&path) {
                Ok(config) => {
                    app.store = Store::with_config(config);
                    app.show_status(format!("Loaded {}", path.display()));
                    app.current_file = Some(path);
                }
                Err(e) => app.notify_error(format!("Load failed: {e}")),
            }
        }
        log::info!("Solver: {}", app.solver.command().display());
        app
    }

    fn show_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Report a non-fatal failure in the status bar and the log.
    fn notify_error(&mut self, msg: String) {
        log::error!("{msg}");
        self.store.dispatch(Action::AppendLog(format!("[Error] {msg}")));
        self.show_status(msg);
    }

    // ========================================================================
    // File operations (using rfd)
    // ========================================================================

    fn save_config(&mut self) {
        if let Some(path) = self.current_file.clone() {
            match self.store.config().save(&path) {
                Ok(()) => self.show_status(format!("Saved to {}", path.display())),
                Err(e) => self.notify_error(format!("Save failed: {e}")),
            }
        } else {
            self.save_config_as();
        }
    }

    fn save_config_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("simulation.json")
            .save_file()
        {
            match self.store.config().save(&path) {
                Ok(()) => {
                    self.show_status(format!("Saved to {}", path.display()));
                    self.current_file = Some(path);
                }
                Err(e) => self.notify_error(format!("Save failed: {e}")),
            }
        }
    }

    fn load_config(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            let loaded = ConfigDocument::load(&path).and_then(|doc| {
                self.store
                    .try_dispatch(Action::LoadConfig(doc))
                    .map_err(Into::into)
            });
            match loaded {
                Ok(()) => {
                    self.parameters.errors.clear();
                    self.show_status(format!("Loaded {}", path.display()));
                    self.current_file = Some(path);
                }
                Err(e) => self.notify_error(format!("Load failed: {e}")),
            }
        }
    }

    // ========================================================================
    // Run control
    // ========================================================================

    fn handle_command(&mut self, command: RunCommand) {
        match command {
            RunCommand::Run => match self.controller.run(&mut self.store, &mut self.solver) {
                Ok(RunOutcome::Started(id)) => self.show_status(format!("Run {id} started")),
                Ok(RunOutcome::AlreadyRunning) => {}
                Err(e) => self.notify_error(format!("Run failed: {e}")),
            },
            RunCommand::Stop => match self.controller.stop(&mut self.store) {
                Ok(()) => self.show_status("Stop requested"),
                Err(e) => self.notify_error(format!("Stop failed: {e}")),
            },
            RunCommand::DrawModel => self.draw_model(),
            RunCommand::Reset => {
                self.store.dispatch(Action::ResetToDefault);
                self.parameters.errors.clear();
                self.current_file = None;
                self.show_status("Parameters reset");
            }
        }
    }

    /// Load the restart file's particle state into the viewport.
    fn draw_model(&mut self) {
        let Some(path) = self.store.config().restart_path().map(|p| p.to_path_buf()) else {
            log::debug!("Draw Model ignored: no restart file set");
            return;
        };
        if let Err(e) = self.loader.request(&path) {
            self.notify_error(format!("Draw Model failed: {e}"));
        } else {
            self.show_status(format!("Loading {}", path.display()));
        }
    }

    /// Drain the bus, the run controller and the snapshot loader.
    fn process_events(&mut self) {
        self.pipeline.pump(&mut self.store);

        if let Some(finished) = self.controller.poll(&mut self.store) {
            match finished.status {
                RunStatus::Completed => {
                    self.show_status(format!("Run {} completed", finished.run_id));
                    if let Some(path) = finished.snapshot {
                        if let Err(e) = self.loader.request(path) {
                            self.notify_error(format!("Loading result failed: {e}"));
                        }
                    }
                }
                RunStatus::Cancelled => self.show_status(format!("Run {} cancelled", finished.run_id)),
                RunStatus::Failed(reason) => {
                    self.notify_error(format!("Run {} failed: {reason}", finished.run_id))
                }
            }
        }

        while let Some((path, result)) = self.loader.try_recv() {
            match result {
                Ok(snapshot) => {
                    let count = snapshot.len();
                    self.store.dispatch(Action::SetSnapshot(Arc::new(snapshot)));
                    self.show_status(format!("Loaded {count} particles from {}", path.display()));
                }
                Err(e) => self.notify_error(e.to_string()),
            }
        }
    }
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_events();

        let is_running = self.store.runtime().is_running;

        // Menu bar
        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New").clicked() {
                        self.handle_command(RunCommand::Reset);
                        ui.close_menu();
                    }
                    if ui.button("Open...").clicked() {
                        self.load_config();
                        ui.close_menu();
                    }
                    if ui.button("Save").clicked() {
                        self.save_config();
                        ui.close_menu();
                    }
                    if ui.button("Save As...").clicked() {
                        self.save_config_as();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    let has_snapshot = self.store.runtime().snapshot.is_some();
                    if ui
                        .add_enabled(has_snapshot, egui::Button::new("Back to Preview"))
                        .clicked()
                    {
                        self.store.dispatch(Action::ClearSnapshot);
                        ui.close_menu();
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let expired = self
                    .status_message
                    .as_ref()
                    .is_some_and(|(_, time)| time.elapsed().as_secs() >= STATUS_SECONDS);
                if expired {
                    self.status_message = None;
                }
                if let Some((msg, _)) = &self.status_message {
                    ui.label(msg);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    match self.store.runtime().snapshot.as_ref() {
                        Some(snapshot) => ui.label(format!(
                            "step {} | t = {:.4} s | {} particles",
                            snapshot.step,
                            snapshot.time,
                            snapshot.len()
                        )),
                        None => ui.label(egui::RichText::new("preview").weak()),
                    };

                    ui.separator();

                    if let Some(file) = &self.current_file {
                        ui.label(egui::RichText::new(file.display().to_string()).small().weak());
                    } else {
                        ui.label(egui::RichText::new("(unsaved)").small().weak());
                    }
                });
            });
        });

        // Left panel: parameters and log
        egui::SidePanel::left("settings")
            .min_width(320.0)
            .default_width(380.0)
            .show(ctx, |ui| {
                let has_restart = self.store.config().restart_path().is_some();
                if let Some(command) = render_run_bar(ui, is_running, has_restart) {
                    self.handle_command(command);
                }
                ui.separator();

                ui.horizontal(|ui| {
                    ui.selectable_value(&mut self.selected_tab, SidebarTab::Parameters, "Parameters");
                    let log_label = format!("Log ({})", self.store.runtime().log.len());
                    ui.selectable_value(&mut self.selected_tab, SidebarTab::Log, log_label);
                });
                ui.separator();

                match self.selected_tab {
                    SidebarTab::Parameters => {
                        let actions = egui::ScrollArea::vertical()
                            .show(ui, |ui| self.parameters.show(ui, self.store.config()))
                            .inner;
                        if !actions.is_empty() {
                            self.parameters.errors.apply(&mut self.store, actions);
                        }
                    }
                    SidebarTab::Log => {
                        if render_log_panel(ui, &self.store.runtime().log) {
                            self.store.dispatch(Action::ClearLog);
                        }
                    }
                }
            });

        // Central panel: 3D viewport
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::from_rgb(18, 20, 26)))
            .show(ctx, |ui| {
                let state = self.store.state();
                self.viewport.show(
                    ui,
                    &state.config,
                    state.runtime.snapshot.as_ref(),
                    state.runtime.is_running,
                );
            });
    }
}

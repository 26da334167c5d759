//! Live viewer for scenario files
//!
//! Animates a scenario in a window and rebuilds it whenever the file on
//! disk changes.

use anyhow::Result;
use atomsim_core::diagnostics::{format_diagnostic, format_error};
use atomsim_core::{
    build_simulation_context_from_source, evaluate_detectors, get_atom_states, step_simulation,
    AtomState, SimulationContext,
};
use eframe::egui;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::mpsc;
use tracing::{info, warn};

/// Smallest half-width of the visible world, in world units
const MIN_VIEW_EXTENT: f64 = 5.0;

/// Open the viewer window and block until it closes
pub fn run(source_path: PathBuf) -> Result<()> {
    let title = format!("atomsim - {}", source_path.display());
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(Viewer::new(source_path, cc)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}

pub struct Viewer {
    source_path: PathBuf,
    source_text: String,
    ctx_opt: Option<SimulationContext>,
    last_load_error: Option<String>,
    /// Half-width of the visible world, fixed at load time
    view_extent: f64,
    playing: bool,
    steps_per_frame: u32,
    _file_watcher: Option<RecommendedWatcher>,
    file_receiver: mpsc::Receiver<notify::Result<Event>>,
}

impl Viewer {
    pub fn new(source_path: PathBuf, _cc: &eframe::CreationContext<'_>) -> Self {
        let (tx, rx) = mpsc::channel();
        let watcher = notify::recommended_watcher(move |res| {
            // receiver is gone during shutdown
            let _ = tx.send(res);
        })
        .and_then(|mut w| {
            w.watch(&source_path, RecursiveMode::NonRecursive)?;
            Ok(w)
        });
        let watcher = match watcher {
            Ok(w) => Some(w),
            Err(e) => {
                warn!("not watching {}: {}", source_path.display(), e);
                None
            }
        };

        let mut viewer = Self {
            source_path,
            source_text: String::new(),
            ctx_opt: None,
            last_load_error: None,
            view_extent: MIN_VIEW_EXTENT,
            playing: false,
            steps_per_frame: 1,
            _file_watcher: watcher,
            file_receiver: rx,
        };
        viewer.read_source();
        viewer.reload_context();
        viewer
    }

    fn read_source(&mut self) {
        match std::fs::read_to_string(&self.source_path) {
            Ok(text) => self.source_text = text,
            Err(e) => {
                self.source_text.clear();
                self.last_load_error = Some(format!("reading {}: {}", self.source_path.display(), e));
            }
        }
    }

    fn reload_context(&mut self) {
        match build_simulation_context_from_source(&self.source_text) {
            Ok((ctx, diagnostics)) => {
                for diagnostic in &diagnostics {
                    warn!("{}", format_diagnostic(diagnostic, &self.source_text));
                }
                self.view_extent = fit_extent(&get_atom_states(&ctx));
                info!(atoms = ctx.world.len(), "loaded {}", self.source_path.display());
                self.ctx_opt = Some(ctx);
                self.last_load_error = None;
            }
            Err(e) => {
                let message = format_error(&e, &self.source_text);
                self.last_load_error = Some(message);
                self.ctx_opt = None;
                self.playing = false;
            }
        }
    }

    fn check_file_changes(&mut self) {
        let mut changed = false;
        while let Ok(event) = self.file_receiver.try_recv() {
            match event {
                Ok(Event {
                    kind: EventKind::Modify(_) | EventKind::Create(_),
                    ..
                }) => changed = true,
                Ok(_) => {}
                Err(e) => warn!("file watcher error: {}", e),
            }
        }

        if changed {
            self.read_source();
            self.reload_context();
        }
    }
}

/// Half-width that keeps every atom on screen with some margin
fn fit_extent(atoms: &[AtomState]) -> f64 {
    atoms
        .iter()
        .map(|a| a.position.x.abs().max(a.position.y.abs()) + a.radius)
        .fold(MIN_VIEW_EXTENT, f64::max)
        * 1.2
}

impl eframe::App for Viewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_file_changes();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button(if self.playing { "⏸ Pause" } else { "▶ Play" }).clicked() {
                    self.playing = !self.playing;
                }
                if ui.button("⏮ Reset").clicked() {
                    self.reload_context();
                    self.playing = false;
                }
                if ui.button("⏭ Step").clicked() {
                    if let Some(ref mut sim) = self.ctx_opt {
                        step_simulation(sim);
                    }
                }

                ui.separator();
                ui.label("Steps/frame:");
                ui.add(egui::Slider::new(&mut self.steps_per_frame, 1..=50));

                if let Some(ref sim) = self.ctx_opt {
                    ui.separator();
                    ui.label(format!("Step: {} / {}", sim.current_step, sim.max_steps));
                    ui.label(format!("Contacts: {}", sim.world.last_contacts()));
                    ui.label(format!("Energy: {:.4}", sim.world.total_kinetic_energy()));
                }
            });
        });

        if let Some(ref sim) = self.ctx_opt {
            if !sim.detectors.is_empty() {
                egui::SidePanel::right("detectors").show(ctx, |ui| {
                    ui.heading("Detectors");
                    match evaluate_detectors(sim) {
                        Ok(results) => {
                            for detector in results {
                                ui.label(format!("{} = {:.6}", detector.name, detector.value));
                            }
                        }
                        Err(e) => {
                            ui.colored_label(egui::Color32::RED, e.to_string());
                        }
                    }
                });
            }
        }

        if let Some(ref error) = self.last_load_error {
            egui::TopBottomPanel::bottom("errors").show(ctx, |ui| {
                ui.set_max_height(120.0);
                ui.label(egui::RichText::new(error).color(egui::Color32::RED).monospace());
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let rect = ui.max_rect();
            let painter = ui.painter();

            // y up in the world, down on screen
            let center = rect.center();
            let scale = rect.width().min(rect.height()) / (2.0 * self.view_extent as f32);
            let to_screen = |x: f64, y: f64| center + egui::vec2(x as f32 * scale, -(y as f32) * scale);

            painter.line_segment(
                [to_screen(-self.view_extent, 0.0), to_screen(self.view_extent, 0.0)],
                egui::Stroke::new(0.5, egui::Color32::DARK_GRAY),
            );
            painter.line_segment(
                [to_screen(0.0, -self.view_extent), to_screen(0.0, self.view_extent)],
                egui::Stroke::new(0.5, egui::Color32::DARK_GRAY),
            );

            if let Some(ref sim) = self.ctx_opt {
                for atom in get_atom_states(sim) {
                    let screen_pos = to_screen(atom.position.x, atom.position.y);
                    let radius = (atom.radius as f32 * scale).max(2.0);

                    painter.circle_filled(screen_pos, radius, egui::Color32::LIGHT_BLUE);
                    painter.circle_stroke(
                        screen_pos,
                        radius,
                        egui::Stroke::new(1.0, egui::Color32::BLUE),
                    );
                    painter.text(
                        screen_pos + egui::vec2(0.0, radius + 4.0),
                        egui::Align2::CENTER_TOP,
                        &atom.name,
                        egui::FontId::default(),
                        egui::Color32::WHITE,
                    );
                }
            }
        });

        if self.playing {
            if let Some(ref mut sim) = self.ctx_opt {
                for _ in 0..self.steps_per_frame {
                    if step_simulation(sim) {
                        self.playing = false;
                        break;
                    }
                }
            }
            ctx.request_repaint();
        }
    }
}

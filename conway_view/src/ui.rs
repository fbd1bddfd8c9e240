// ui.rs - egui front end: draws the latest generation and forwards pause/pan/zoom keys

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use conway_sparse::{Cell, SchedulerError, SchedulerHandle, Snapshot};
use eframe::egui;
use egui::{Color32, Key, Pos2, Rect, Stroke, Vec2};
use log::{error, info};

const CELL_SIZE: f32 = 20.0;
const MIN_CELL_SIZE: f32 = 2.0;
const MAX_CELL_SIZE: f32 = 50.0;
const MIN_PAN_STEP: f32 = 20.0;
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Pan offset and zoom, in screen pixels. Up is positive `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub offset: Vec2,
    pub cell_size: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { offset: Vec2::ZERO, cell_size: CELL_SIZE }
    }
}

impl Viewport {
    fn pan_step(&self) -> f32 {
        self.cell_size.max(MIN_PAN_STEP)
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let step = self.pan_step();
        self.offset += Vec2::new(dx * step, dy * step);
    }

    pub fn zoom_in(&mut self) {
        if self.cell_size < MAX_CELL_SIZE {
            self.cell_size *= 2.0;
        }
    }

    pub fn zoom_out(&mut self) {
        if self.cell_size > MIN_CELL_SIZE {
            self.cell_size /= 2.0;
        }
    }

    /// Whether `cell` falls inside a canvas of `size` pixels.
    pub fn in_view(&self, cell: Cell, size: Vec2) -> bool {
        let x = cell.x() as f32 * self.cell_size - self.offset.x;
        let y = cell.y() as f32 * self.cell_size - self.offset.y;
        x.abs() <= size.x / 2.0 && y.abs() <= size.y / 2.0
    }

    /// Screen-space square of `cell` on `canvas`.
    pub fn cell_rect(&self, cell: Cell, canvas: Rect) -> Rect {
        let center = canvas.center();
        let x = center.x + cell.x() as f32 * self.cell_size - self.offset.x;
        let y = center.y - (cell.y() as f32 * self.cell_size - self.offset.y);
        Rect::from_center_size(Pos2::new(x, y), Vec2::splat(self.cell_size))
    }
}

/// Where the viewer leaves the error that stopped the tick loop, for `main`
/// to report once the window has closed.
pub type Failure = Rc<RefCell<Option<SchedulerError>>>;

/// Display side of the simulation. Never waits on the tick loop.
pub struct LifeViewer {
    runtime: tokio::runtime::Runtime,
    scheduler: Option<SchedulerHandle>,
    shown: Snapshot,
    running: bool,
    viewport: Viewport,
    failure: Failure,
    pub live_color: Color32,
    pub grid_color: Color32,
}

impl LifeViewer {
    pub fn new(
        runtime: tokio::runtime::Runtime,
        scheduler: SchedulerHandle,
        running: bool,
        failure: Failure,
    ) -> Self {
        let shown = scheduler.latest();
        Self {
            runtime,
            scheduler: Some(scheduler),
            shown,
            running,
            viewport: Viewport::default(),
            failure,
            live_color: Color32::WHITE,
            grid_color: Color32::from_gray(48),
        }
    }

    fn toggle_pause(&mut self) {
        let Some(scheduler) = &self.scheduler else { return };
        match scheduler.toggle_pause() {
            Ok(()) => self.running = !self.running,
            Err(err) => error!("Cannot toggle pause: {err}"),
        }
    }

    /// Adopts the newest generation if one arrived since the last frame.
    ///
    /// Returns `true` once the tick loop has failed and the window should close.
    fn poll_scheduler(&mut self) -> bool {
        let Some(scheduler) = self.scheduler.as_mut() else { return false };

        if let Some(snapshot) = scheduler.poll() {
            self.shown = snapshot;
        }

        if !scheduler.is_finished() {
            return false;
        }
        let Some(scheduler) = self.scheduler.take() else { return false };
        match self.runtime.block_on(scheduler.join()) {
            Ok(()) => {
                info!("Tick loop finished");
                false
            }
            Err(err) => {
                error!("Simulation stopped: {err}");
                *self.failure.borrow_mut() = Some(err);
                true
            }
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (toggle, up, down, left, right, zoom_in, zoom_out) = ctx.input(|i| {
            (
                i.key_pressed(Key::Enter),
                i.key_pressed(Key::ArrowUp),
                i.key_pressed(Key::ArrowDown),
                i.key_pressed(Key::ArrowLeft),
                i.key_pressed(Key::ArrowRight),
                i.key_pressed(Key::I),
                i.key_pressed(Key::O),
            )
        });

        if toggle { self.toggle_pause(); }
        if up { self.viewport.pan(0.0, 1.0); }
        if down { self.viewport.pan(0.0, -1.0); }
        if left { self.viewport.pan(-1.0, 0.0); }
        if right { self.viewport.pan(1.0, 0.0); }
        if zoom_in { self.viewport.zoom_in(); }
        if zoom_out { self.viewport.zoom_out(); }
    }

    fn draw_grid(&self, painter: &egui::Painter, canvas: Rect) {
        let stroke = Stroke::new(1.0, self.grid_color);
        let pitch = self.viewport.cell_size;

        let mut x = canvas.left() + pitch / 2.0;
        while x < canvas.right() {
            painter.line_segment([Pos2::new(x, canvas.top()), Pos2::new(x, canvas.bottom())], stroke);
            x += pitch;
        }
        let mut y = canvas.top() + pitch / 2.0;
        while y < canvas.bottom() {
            painter.line_segment([Pos2::new(canvas.left(), y), Pos2::new(canvas.right(), y)], stroke);
            y += pitch;
        }
    }
}

impl eframe::App for LifeViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.poll_scheduler() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        self.handle_keys(ctx);

        egui::TopBottomPanel::top("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let button_text = if self.running { "⏸ Pause" } else { "▶ Start" };
                if ui.button(button_text).clicked() {
                    self.toggle_pause();
                }

                ui.separator();
                ui.label(format!("Generation: {}", self.shown.generation));
                ui.label(format!("Live cells: {}", self.shown.cells.len()));

                ui.separator();
                ui.label("Enter: start/pause · arrows: pan · I/O: zoom");
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::BLACK))
            .show(ctx, |ui| {
                let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
                let canvas = response.rect;

                for &cell in self.shown.cells.iter() {
                    if !self.viewport.in_view(cell, canvas.size()) {
                        continue;
                    }
                    painter.rect_filled(self.viewport.cell_rect(cell, canvas), 0.0, self.live_color);
                }

                self.draw_grid(&painter, canvas);
            });

        // Keep polling the handoff channel while idle
        ctx.request_repaint_after(FRAME_INTERVAL);
    }
}

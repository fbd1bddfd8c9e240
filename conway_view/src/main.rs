// main.rs - Sparse Game of Life viewer
// Loads the starting cells, starts the tick loop and hands both to the egui window

use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use conway_sparse::TickScheduler;
use eframe::egui;
use log::{error, info};

mod args;  // Command line flags
mod input; // Coordinate and plaintext loaders
mod ui;    // egui viewer

use args::Args;
use ui::{Failure, LifeViewer};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.sim_config()?;
    let initial = input::load(&args)?;
    info!("Loaded {} live cells", initial.len());

    let runtime = tokio::runtime::Runtime::new()?;
    let scheduler = TickScheduler::start(config, initial, runtime.handle());
    if args.run {
        scheduler.toggle_pause()?;
    }
    let failure = Failure::default();
    let viewer = LifeViewer::new(runtime, scheduler, args.run, Rc::clone(&failure));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 1000.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sparse Game of Life",
        options,
        Box::new(|_cc| Box::new(viewer)),
    )?;

    // The window closes itself when the tick loop fails
    match failure.take() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

mod app;
mod color;
mod config;
mod data;
mod export;
mod state;
mod ui;

use app::ListingLensApp;
use config::Settings;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::from_env();
    log::debug!("Starting with {settings:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.window_width, settings.window_height])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Listing Lens – Rental Listings Insights",
        options,
        Box::new(|_cc| Ok(Box::new(ListingLensApp::new(settings)))),
    )
}

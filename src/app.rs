use eframe::egui;

use crate::config::Settings;
use crate::state::AppState;
use crate::ui::{pages, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ListingLensApp {
    pub state: AppState,
}

impl ListingLensApp {
    /// Create the app and open the configured dataset if it exists.
    pub fn new(settings: Settings) -> Self {
        let data_path = settings.data_path.clone();
        let mut state = AppState::new(settings);
        if data_path.exists() {
            state.open(&data_path);
        } else {
            log::info!(
                "No dataset at {}, waiting for File → Open…",
                data_path.display()
            );
        }
        Self { state }
    }
}

impl eframe::App for ListingLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: menu and filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: selected page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            pages::central_panel(ui, &mut self.state);
        });
    }
}

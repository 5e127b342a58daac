//! Top-level entry point for running the dashboard as a native window.

use eframe::egui;

use crate::config::DashboardConfig;

use super::DashboardApp;

/// Open the dashboard window for `cfg` and block until it is closed.
pub fn run_dashboard(cfg: DashboardConfig) -> eframe::Result<()> {
    let [w, h] = cfg.window_size;
    let opts = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(cfg.title.clone())
            .with_inner_size(egui::vec2(w, h)),
        ..Default::default()
    };

    let title = cfg.title.clone();
    log::info!(
        "Starting dashboard for {} (refresh every {:.1}s)",
        cfg.data_path.display(),
        cfg.poll_interval_secs
    );
    let app = DashboardApp::new(cfg);

    eframe::run_native(
        &title,
        opts,
        Box::new(|cc| {
            // Install Phosphor icon font before creating the app.
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            Ok(Box::new(app))
        }),
    )
}

//! Standalone dashboard window.
//!
//! [`DashboardApp`] owns one [`RefreshSession`] and drives it from the frame
//! loop: a tick fires whenever the poll interval has elapsed, and right away
//! when the user picks a metric from the dropdown.

use std::time::{Duration, Instant};

use eframe::egui;
use egui_phosphor::regular::{CLOCK, HOURGLASS, WARNING};

use crate::config::DashboardConfig;
use crate::data::source::CsvSource;
use crate::plot::{show_chart, transition_opacity};
use crate::refresh::{RefreshSession, TickOutcome, TickOutput};

// ─────────────────────────────────────────────────────────────────────────────
// DashboardApp
// ─────────────────────────────────────────────────────────────────────────────

pub struct DashboardApp {
    session: RefreshSession<CsvSource>,
    config: DashboardConfig,
    /// Metric picked by the user; `None` plots the default metric.
    selected: Option<String>,
    last_output: Option<TickOutput>,
    last_tick: Option<Instant>,
    /// Push the chart's framing into the plot on the next frame.
    pending_framing: bool,
    /// When the current description replaced the previous one.
    shown_at: Instant,
}

impl DashboardApp {
    pub fn new(config: DashboardConfig) -> Self {
        let session = RefreshSession::for_path(config.data_path.clone())
            .with_read_timeout(config.read_timeout());
        Self {
            session,
            selected: config.initial_metric.clone(),
            config,
            last_output: None,
            last_tick: None,
            pending_framing: true,
            shown_at: Instant::now(),
        }
    }

    fn tick_due(&self) -> bool {
        self.last_tick
            .map_or(true, |t| t.elapsed() >= self.config.poll_interval())
    }

    fn accept(&mut self, output: TickOutput) {
        // a reused chart already matches what the user sees
        if output.outcome != TickOutcome::Reused {
            self.pending_framing = true;
            self.shown_at = Instant::now();
        }
        self.last_tick = Some(Instant::now());
        self.last_output = Some(output);
    }

    fn refresh(&mut self) {
        let output = self.session.tick(self.selected.as_deref());
        self.accept(output);
    }

    fn select(&mut self, metric: String) {
        let output = self.session.select_metric(&metric);
        self.selected = Some(metric);
        self.accept(output);
    }

    fn top_panel(&mut self, ctx: &egui::Context) {
        let mut picked: Option<String> = None;
        egui::TopBottomPanel::top("dashboard_top").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.vertical_centered(|ui| {
                ui.heading(&self.config.headline);
            });
            ui.add_space(4.0);

            let (metrics, shown) = match &self.last_output {
                Some(out) => (
                    out.metrics.clone(),
                    self.selected
                        .clone()
                        .or_else(|| out.selected_metric.clone())
                        .unwrap_or_default(),
                ),
                None => (Vec::new(), self.selected.clone().unwrap_or_default()),
            };
            ui.horizontal(|ui| {
                ui.label("Select pH Type");
                egui::ComboBox::from_id_salt("metric_select")
                    .selected_text(shown.clone())
                    .show_ui(ui, |ui| {
                        for m in &metrics {
                            if ui.selectable_label(*m == shown, m).clicked() && *m != shown {
                                picked = Some(m.clone());
                            }
                        }
                    });
            });
            ui.add_space(4.0);
        });
        if let Some(m) = picked {
            self.select(m);
        }
    }

    fn status_panel(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("dashboard_status").show(ctx, |ui| {
            let Some(out) = &self.last_output else {
                ui.label(format!("{HOURGLASS} Loading..."));
                return;
            };
            let icon = match out.outcome {
                TickOutcome::Rebuilt | TickOutcome::Reused => CLOCK,
                TickOutcome::Waiting => HOURGLASS,
                TickOutcome::ReadFailed | TickOutcome::UnknownMetric => WARNING,
            };
            ui.label(format!("{icon} {}", out.status));
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.tick_due() {
            self.refresh();
        }

        self.top_panel(ctx);
        self.status_panel(ctx);

        let mut payload = None;
        let mut fading = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(out) = &self.last_output else {
                return;
            };
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new(&out.chart.title).strong().size(16.0));
            });
            let opacity = transition_opacity(self.shown_at.elapsed(), out.chart.transition_ms);
            fading = opacity < 1.0;
            payload = show_chart(ui, &out.chart, self.pending_framing, opacity);
        });
        self.pending_framing = false;
        if let Some(p) = payload {
            self.session.capture(&p);
        }

        let wait = self
            .last_tick
            .map(|t| self.config.poll_interval().saturating_sub(t.elapsed()))
            .unwrap_or(Duration::ZERO);
        if fading {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(wait);
        }
    }
}

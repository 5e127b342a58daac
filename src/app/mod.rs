//! Native dashboard window.
//!
//! | Sub-module          | Responsibility |
//! | ------------------- | -------------- |
//! | [`dashboard_app`]   | [`DashboardApp`]: timer-driven ticks, metric dropdown, status line |
//! | [`run`]             | [`run_dashboard()`] entry point and font setup |

mod dashboard_app;
mod run;

pub use dashboard_app::DashboardApp;
pub use run::run_dashboard;

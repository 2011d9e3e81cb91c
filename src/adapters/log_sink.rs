//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing game events to the `log` facade
//! (`env_logger` on the host).  Scores are rendered the way the cabinet's
//! score display shows them: zero-padded, [`TOTAL_WIDTH`] digits for the
//! running total and [`DRINK_WIDTH`] per drink.

use std::fmt::Write as _;

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Digits shown for the total score.
pub const TOTAL_WIDTH: usize = 8;
/// Digits shown for each drink's score.
pub const DRINK_WIDTH: usize = 2;

/// Zero-pad `score` to at least `width` digits.
pub fn format_score(score: u32, width: usize) -> String {
    let mut s = String::new();
    let _ = write!(s, "{score:0width$}");
    s
}

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("START | actuators powered"),
            AppEvent::MasterEnabled(on) => {
                info!("POWER | actuator bank {}", if *on { "ON" } else { "OFF" });
            }
            AppEvent::ElementHit { code, bumper, hits } => {
                info!("HIT   | {} (code {}) x{}", bumper, code, hits);
            }
            AppEvent::UnrecognisedCode(code) => {
                warn!("NOISE | code {:#b} has no owner", code);
            }
            AppEvent::ScoreChanged { drink, score, total } => {
                info!(
                    "SCORE | {} {} | total {}",
                    drink,
                    format_score(*score, DRINK_WIDTH),
                    format_score(*total, TOTAL_WIDTH)
                );
            }
            AppEvent::PumpStarted { pump, run_for } => {
                info!("PUMP  | {} on for {:.2}s", pump, run_for.as_secs_f32());
            }
            AppEvent::PumpIdle { pump } => info!("PUMP  | {} idle", pump),
            AppEvent::Poured { drink, score, total } => {
                info!(
                    "POUR  | {} wins with {} points, {:.2}s",
                    drink,
                    score,
                    total.as_secs_f32()
                );
            }
            AppEvent::RoundReset => info!("ROUND | scores cleared"),
            AppEvent::ActionFailed(e) => warn!("FAIL  | {}", e),
        }
    }
}

//! Structured + human-readable logging for pipeline node boundaries, in the
//! corpus's colorized style.

use colored::{Color, Colorize};
use tracing::info;

use crate::director::masks::MaskVariant;
use crate::director::pipeline::PipelineState;
use crate::director::world::state::Phase;

fn badge(label: &str, color: Color) -> String {
    format!(" {} ", label).on_color(color).black().bold().to_string()
}

fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Normal => Color::Green,
        Phase::Rising => Color::Yellow,
        Phase::Critical => Color::BrightYellow,
        Phase::Breaking => Color::Red,
        Phase::Apocalypse => Color::BrightRed,
    }
}

fn mask_label(mask: MaskVariant) -> &'static str {
    match mask {
        MaskVariant::Trickster => "TRICKSTER",
        MaskVariant::Prophet => "PROPHET",
        MaskVariant::Friend => "FRIEND",
        MaskVariant::ChaosBringer => "CHAOS",
        MaskVariant::Observer => "OBSERVER",
        MaskVariant::Gambler => "GAMBLER",
    }
}

pub fn log_pipeline_outcome(event_kind: &str, mask: MaskVariant, phase: Phase, terminal: PipelineState, tool_calls: usize, rejected: usize) {
    let line = format!(
        "{} event={event_kind} mask={} phase={} terminal={terminal:?} calls={tool_calls} rejected={rejected}",
        badge("DIRECTOR", Color::Blue),
        badge(mask_label(mask), Color::Magenta),
        badge(&format!("{phase:?}").to_uppercase(), phase_color(phase)),
    );
    info!("{}", line);
}

pub fn log_queue_overflow(count: u64) {
    info!("{} overflow_count={count}", badge("QUEUE", Color::Red));
}

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

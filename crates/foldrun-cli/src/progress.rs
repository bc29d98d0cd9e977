use foldrun::engine::progress::{Progress, ProgressCallback};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Bridges engine progress events onto an indicatif spinner on stderr.
///
/// The workflow reports one phase at a time; a new phase replaces the
/// previous spinner, and finished phases are echoed as plain lines above
/// it so they survive the redraw.
pub struct ProgressUi {
    mp: MultiProgress,
    state: Arc<Mutex<BarState>>,
}

#[derive(Default)]
struct BarState {
    active_bar: Option<ProgressBar>,
    base_message: String,
}

impl ProgressUi {
    pub fn new() -> Self {
        let mp = MultiProgress::new();
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        Self {
            mp,
            state: Arc::new(Mutex::new(BarState::default())),
        }
    }

    #[cfg(test)]
    fn hidden() -> Self {
        let ui = Self::new();
        ui.mp.set_draw_target(ProgressDrawTarget::hidden());
        ui
    }

    pub fn callback(&self) -> ProgressCallback<'_> {
        Box::new(move |event| self.handle(event))
    }

    /// Clears any spinner still running, e.g. after an aborted job.
    pub fn finish(&self) {
        if let Ok(mut state) = self.state.lock()
            && let Some(bar) = state.active_bar.take()
        {
            bar.finish_and_clear();
        }
    }

    fn handle(&self, event: Progress) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        match event {
            Progress::PhaseStart { name } => {
                if let Some(bar) = state.active_bar.take() {
                    bar.finish_and_clear();
                }

                let pb = self.mp.add(ProgressBar::new_spinner());
                pb.enable_steady_tick(Duration::from_millis(80));
                pb.set_style(Self::spinner_style());
                pb.set_message(name.to_string());

                state.active_bar = Some(pb);
                state.base_message = name.to_string();
            }
            Progress::PhaseFinish => {
                if let Some(bar) = state.active_bar.take() {
                    bar.finish_and_clear();
                }

                let final_message = format!("✓ {}", state.base_message);
                self.mp.println(final_message).ok();

                state.base_message.clear();
            }
            Progress::StatusUpdate { text } => {
                if let Some(bar) = state.active_bar.as_ref() {
                    bar.set_message(format!("{} ({})", state.base_message, text));
                }
            }
            Progress::Message(msg) => {
                self.mp.println(format!("  {}", msg)).ok();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Invalid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
    }
}

impl Default for ProgressUi {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_start_creates_new_spinner() {
        let ui = ProgressUi::hidden();
        ui.handle(Progress::PhaseStart {
            name: "Feature extraction",
        });

        let state = ui.state.lock().unwrap();
        let bar = state.active_bar.as_ref().unwrap();
        assert_eq!(bar.message(), "Feature extraction");
        assert_eq!(state.base_message, "Feature extraction");
    }

    #[test]
    fn phase_start_replaces_existing_bar() {
        let ui = ProgressUi::hidden();
        ui.handle(Progress::PhaseStart { name: "First" });
        ui.handle(Progress::PhaseStart { name: "Second" });

        let state = ui.state.lock().unwrap();
        assert_eq!(state.active_bar.as_ref().unwrap().message(), "Second");
        assert_eq!(state.base_message, "Second");
    }

    #[test]
    fn phase_finish_clears_active_bar() {
        let ui = ProgressUi::hidden();
        ui.handle(Progress::PhaseStart { name: "Inference" });
        ui.handle(Progress::PhaseFinish);

        let state = ui.state.lock().unwrap();
        assert!(state.active_bar.is_none());
        assert!(state.base_message.is_empty());
    }

    #[test]
    fn status_update_changes_bar_message() {
        let ui = ProgressUi::hidden();
        ui.handle(Progress::PhaseStart { name: "Inference" });
        ui.handle(Progress::StatusUpdate {
            text: "model_1 (1/5)".to_string(),
        });

        let state = ui.state.lock().unwrap();
        assert_eq!(
            state.active_bar.as_ref().unwrap().message(),
            "Inference (model_1 (1/5))"
        );
    }

    #[test]
    fn callback_forwards_events() {
        let ui = ProgressUi::hidden();
        let callback = ui.callback();
        callback(Progress::PhaseStart { name: "Relaxation" });
        drop(callback);

        let state = ui.state.lock().unwrap();
        assert_eq!(state.base_message, "Relaxation");
    }
}

use std::time::{Duration, Instant};

use tracing::debug;
use wwwcraft_core::timers::Timeline;

use super::{Control, UiSurface, HIDDEN, SHOW};

/// Emphasis is dropped this long after the toast appears.
pub const TOAST_FADE_AFTER: Duration = Duration::from_millis(1000);
/// The toast is hidden again this long after it appears.
pub const TOAST_HIDE_AFTER: Duration = Duration::from_millis(1350);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToastStep {
    Emphasize,
    Fade,
    Hide,
}

/// Save/load confirmations. Only one toast runs at a time: showing a new one
/// cancels whatever is left of the previous sequence and hides that toast.
#[derive(Debug, Default)]
pub struct Toasts {
    timeline: Timeline<(Control, ToastStep)>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, ui: &mut impl UiSurface, toast: Control, now: Instant) {
        let mut interrupted: Vec<Control> = self
            .timeline
            .cancel_all()
            .into_iter()
            .map(|(control, _)| control)
            .collect();
        interrupted.dedup();
        for control in interrupted {
            debug!("Interrupting toast {}", control.selector());
            ui.set_class(control, SHOW, false);
            ui.set_hidden(control, true);
        }

        ui.set_hidden(toast, false);
        self.timeline
            .schedule(now, Duration::ZERO, (toast, ToastStep::Emphasize));
        self.timeline
            .schedule(now, TOAST_FADE_AFTER, (toast, ToastStep::Fade));
        self.timeline
            .schedule(now, TOAST_HIDE_AFTER, (toast, ToastStep::Hide));
    }

    pub fn update(&mut self, ui: &mut impl UiSurface, now: Instant) {
        for (toast, step) in self.timeline.due(now) {
            match step {
                ToastStep::Emphasize => ui.set_class(toast, SHOW, true),
                ToastStep::Fade => ui.set_class(toast, SHOW, false),
                ToastStep::Hide => ui.set_hidden(toast, true),
            };
        }
    }

    pub fn is_active(&self) -> bool {
        !self.timeline.is_empty()
    }
}

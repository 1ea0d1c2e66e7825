use tracing::{debug, info};
use wwwcraft_core::events::EventSender;

use crate::app::AppEvent;
use crate::commands::MenuCommand;

/// Host services outside the menu: pointer capture, fullscreen, audio, the
/// touch joystick and the page URL.
pub trait Platform {
    fn is_touch_device(&self) -> bool;

    /// Asks for pointer capture. The outcome arrives later as a
    /// `PointerLockChanged` command.
    fn request_pointer_lock(&mut self);
    fn release_pointer_lock(&mut self);
    fn pointer_locked(&self) -> bool;

    fn is_fullscreen(&self) -> bool;
    fn set_fullscreen(&mut self, fullscreen: bool);

    fn set_audio_disabled(&mut self, disabled: bool);
    fn init_joystick(&mut self);

    /// Fragment of the page URL, including the leading `#`, or empty.
    fn url_fragment(&self) -> String;
}

/// Platform for the console frontend: capture requests are granted at once
/// and echoed back through the event queue like a browser would.
pub struct HeadlessPlatform {
    events: EventSender<AppEvent>,
    touch: bool,
    fragment: String,
    locked: bool,
    fullscreen: bool,
    pub audio_disabled: bool,
    pub joystick_ready: bool,
}

impl HeadlessPlatform {
    pub fn new(events: EventSender<AppEvent>, touch: bool, fragment: String) -> Self {
        Self {
            events,
            touch,
            fragment,
            locked: false,
            fullscreen: false,
            audio_disabled: false,
            joystick_ready: false,
        }
    }

    fn set_locked(&mut self, locked: bool) {
        if self.locked == locked {
            return;
        }
        self.locked = locked;
        if self
            .events
            .send(AppEvent::Menu(MenuCommand::PointerLockChanged(locked)))
            .is_err()
        {
            debug!("Event loop closed; dropping pointer lock change");
        }
    }
}

impl Platform for HeadlessPlatform {
    fn is_touch_device(&self) -> bool {
        self.touch
    }

    fn request_pointer_lock(&mut self) {
        self.set_locked(true);
    }

    fn release_pointer_lock(&mut self) {
        self.set_locked(false);
    }

    fn pointer_locked(&self) -> bool {
        self.locked
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
        info!("Fullscreen {}", if fullscreen { "on" } else { "off" });
    }

    fn set_audio_disabled(&mut self, disabled: bool) {
        self.audio_disabled = disabled;
    }

    fn init_joystick(&mut self) {
        self.joystick_ready = true;
    }

    fn url_fragment(&self) -> String {
        self.fragment.clone()
    }
}

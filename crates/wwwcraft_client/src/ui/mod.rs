pub mod link_dialog;
pub mod toast;

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;

use tracing::debug;

pub const HIDDEN: &str = "hidden";
pub const START: &str = "start";
pub const SHOW: &str = "show";

/// Logical controls of the menu markup. The controller never talks to a
/// concrete toolkit, only to these names through [`UiSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Control {
    Menu,
    CrossHair,
    PlayButton,
    SaveButton,
    FeatureButton,
    Github,
    SaveToast,
    LoadToast,
    SettingsPanel,
    FeaturesPanel,
    DistanceLabel,
    FovLabel,
    MusicLabel,
    LinkForm,
    LinkSubset,
    AnchorSubset,
    LinkInput,
    TargetInput,
    AnchorInput,
}

impl Control {
    pub const ALL: [Control; 19] = [
        Control::Menu,
        Control::CrossHair,
        Control::PlayButton,
        Control::SaveButton,
        Control::FeatureButton,
        Control::Github,
        Control::SaveToast,
        Control::LoadToast,
        Control::SettingsPanel,
        Control::FeaturesPanel,
        Control::DistanceLabel,
        Control::FovLabel,
        Control::MusicLabel,
        Control::LinkForm,
        Control::LinkSubset,
        Control::AnchorSubset,
        Control::LinkInput,
        Control::TargetInput,
        Control::AnchorInput,
    ];

    pub fn selector(self) -> &'static str {
        match self {
            Control::Menu => ".menu",
            Control::CrossHair => ".cross-hair",
            Control::PlayButton => "#play",
            Control::SaveButton => "#save",
            Control::FeatureButton => "#feature",
            Control::Github => ".github",
            Control::SaveToast => ".save-modal",
            Control::LoadToast => ".load-modal",
            Control::SettingsPanel => ".settings",
            Control::FeaturesPanel => ".features",
            Control::DistanceLabel => "#distance",
            Control::FovLabel => "#fov",
            Control::MusicLabel => "#music",
            Control::LinkForm => ".create-link",
            Control::LinkSubset => ".create-link__link",
            Control::AnchorSubset => ".create-link__anchor",
            Control::LinkInput => "#link",
            Control::TargetInput => "#target",
            Control::AnchorInput => "#anchor",
        }
    }
}

/// Capabilities the controller needs from the UI toolkit. Every call returns
/// `false` when the control is absent; callers treat that as a no-op.
pub trait UiSurface {
    fn set_class(&mut self, control: Control, class: &str, enabled: bool) -> bool;
    fn set_text(&mut self, control: Control, text: &str) -> bool;
    fn set_value(&mut self, control: Control, value: &str) -> bool;
    fn focus(&mut self, control: Control) -> bool;

    fn set_hidden(&mut self, control: Control, hidden: bool) -> bool {
        self.set_class(control, HIDDEN, hidden)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementState {
    pub classes: BTreeSet<String>,
    pub text: String,
    pub value: String,
    pub focused: bool,
}

/// In-memory element tree used by the console frontend.
#[derive(Debug, Clone)]
pub struct ConsoleUi {
    elements: HashMap<Control, ElementState>,
}

impl ConsoleUi {
    /// Every control present, in the state the page markup starts with.
    pub fn new() -> Self {
        let mut elements: HashMap<Control, ElementState> = Control::ALL
            .iter()
            .map(|control| (*control, ElementState::default()))
            .collect();

        let mut classes = |control: Control, names: &[&str]| {
            if let Some(element) = elements.get_mut(&control) {
                element.classes.extend(names.iter().map(|name| name.to_string()));
            }
        };
        classes(Control::Menu, &[START]);
        classes(Control::CrossHair, &[HIDDEN]);
        classes(Control::SaveToast, &[HIDDEN]);
        classes(Control::LoadToast, &[HIDDEN]);
        classes(Control::SettingsPanel, &[HIDDEN]);
        classes(Control::FeaturesPanel, &[HIDDEN]);
        classes(Control::LinkForm, &[HIDDEN]);
        classes(Control::AnchorSubset, &[HIDDEN]);

        let mut ui = Self { elements };
        ui.set_text(Control::PlayButton, "Play");
        ui.set_text(Control::SaveButton, "Load Game");
        ui
    }

    /// Drops a control, as if the markup did not contain it.
    pub fn without(mut self, control: Control) -> Self {
        self.elements.remove(&control);
        self
    }

    pub fn element(&self, control: Control) -> Option<&ElementState> {
        self.elements.get(&control)
    }

    pub fn has_class(&self, control: Control, class: &str) -> bool {
        self.element(control)
            .is_some_and(|element| element.classes.contains(class))
    }

    pub fn is_hidden(&self, control: Control) -> bool {
        self.has_class(control, HIDDEN)
    }

    pub fn text(&self, control: Control) -> Option<&str> {
        self.element(control).map(|element| element.text.as_str())
    }

    pub fn describe(&self) -> String {
        let mut controls: Vec<_> = self.elements.iter().collect();
        controls.sort_by_key(|(control, _)| **control);

        let mut out = String::new();
        for (control, element) in controls {
            let classes: Vec<_> = element.classes.iter().map(String::as_str).collect();
            let _ = write!(out, "{:<22} [{}]", control.selector(), classes.join(" "));
            if !element.text.is_empty() {
                let _ = write!(out, " \"{}\"", element.text);
            }
            if !element.value.is_empty() {
                let _ = write!(out, " value={}", element.value);
            }
            out.push('\n');
        }
        out
    }

    fn element_mut(&mut self, control: Control) -> Option<&mut ElementState> {
        let element = self.elements.get_mut(&control);
        if element.is_none() {
            debug!("UI control {} is missing", control.selector());
        }
        element
    }
}

impl Default for ConsoleUi {
    fn default() -> Self {
        Self::new()
    }
}

impl UiSurface for ConsoleUi {
    fn set_class(&mut self, control: Control, class: &str, enabled: bool) -> bool {
        let Some(element) = self.element_mut(control) else {
            return false;
        };
        if enabled {
            element.classes.insert(class.to_string());
        } else {
            element.classes.remove(class);
        }
        true
    }

    fn set_text(&mut self, control: Control, text: &str) -> bool {
        let Some(element) = self.element_mut(control) else {
            return false;
        };
        element.text = text.to_string();
        true
    }

    fn set_value(&mut self, control: Control, value: &str) -> bool {
        let Some(element) = self.element_mut(control) else {
            return false;
        };
        element.value = value.to_string();
        true
    }

    fn focus(&mut self, control: Control) -> bool {
        if !self.elements.contains_key(&control) {
            debug!("UI control {} is missing", control.selector());
            return false;
        }
        for (other, element) in self.elements.iter_mut() {
            element.focused = *other == control;
        }
        true
    }
}

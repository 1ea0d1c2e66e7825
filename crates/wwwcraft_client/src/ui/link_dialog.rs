use tracing::{debug, info};
use wwwcraft_core::events::{channel, EventReceiver, EventSender};
use wwwcraft_shared::block::BlockAttributes;

use super::{Control, UiSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkKind {
    #[default]
    Link,
    Anchor,
}

/// Field values of the create-link form at submit time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkForm {
    pub kind: LinkKind,
    pub href: String,
    pub target: String,
    pub anchor: String,
}

impl LinkForm {
    pub fn link(href: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: LinkKind::Link,
            href: href.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn anchor(name: impl Into<String>) -> Self {
        Self {
            kind: LinkKind::Anchor,
            anchor: name.into(),
            ..Self::default()
        }
    }

    pub fn into_attributes(self) -> BlockAttributes {
        match self.kind {
            LinkKind::Link => BlockAttributes::Link {
                href: self.href,
                target: Some(self.target),
            },
            LinkKind::Anchor => BlockAttributes::Anchor { name: self.anchor },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Submitted(BlockAttributes),
    Cancelled,
}

/// Handle returned by [`LinkDialog::open`]; resolves exactly once.
pub struct PendingLink {
    outcome: EventReceiver<DialogOutcome>,
}

impl PendingLink {
    /// `None` while the dialog is still waiting for the user.
    pub fn poll(&self) -> Option<DialogOutcome> {
        self.outcome.try_recv().ok()
    }
}

/// The create-link form shown when a link block is placed.
#[derive(Default)]
pub struct LinkDialog {
    responder: Option<EventSender<DialogOutcome>>,
}

impl LinkDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.responder.is_some()
    }

    /// Shows the form with cleared inputs. A request that is still open is
    /// resolved as cancelled first.
    pub fn open(&mut self, ui: &mut impl UiSurface) -> PendingLink {
        if let Some(previous) = self.responder.take() {
            debug!("Link dialog reopened; cancelling previous request");
            let _ = previous.send(DialogOutcome::Cancelled);
        }

        let (tx, rx) = channel();
        self.responder = Some(tx);

        ui.set_hidden(Control::LinkForm, false);
        for input in [Control::LinkInput, Control::TargetInput, Control::AnchorInput] {
            ui.set_value(input, "");
        }
        self.select_kind(ui, LinkKind::Link);
        ui.focus(Control::LinkInput);

        PendingLink { outcome: rx }
    }

    pub fn select_kind(&mut self, ui: &mut impl UiSurface, kind: LinkKind) {
        let anchor = kind == LinkKind::Anchor;
        ui.set_hidden(Control::LinkSubset, anchor);
        ui.set_hidden(Control::AnchorSubset, !anchor);
    }

    /// Resolves the open request. Returns `false` when nothing is waiting,
    /// so a second submit is ignored.
    pub fn submit(&mut self, ui: &mut impl UiSurface, form: LinkForm) -> bool {
        let Some(responder) = self.responder.take() else {
            debug!("Ignoring link form submit with no open request");
            return false;
        };

        ui.set_hidden(Control::LinkForm, true);
        let attributes = form.into_attributes();
        info!("Link dialog submitted: {attributes}");
        let _ = responder.send(DialogOutcome::Submitted(attributes));
        true
    }

    pub fn cancel(&mut self, ui: &mut impl UiSurface) -> bool {
        let Some(responder) = self.responder.take() else {
            return false;
        };

        ui.set_hidden(Control::LinkForm, true);
        let _ = responder.send(DialogOutcome::Cancelled);
        true
    }
}

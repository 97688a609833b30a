//! Client state store for Plaza.
//!
//! One mutable record holds the session, overlay, and wizard state. The
//! setters are the only mutation path: each merges a partial patch,
//! compares the affected slice by value, and publishes a change event on
//! the bus only when the slice actually changed.

use std::sync::{Arc, Mutex};

use crate::db::UserSummary;

use super::bus::{BusEvent, EventBus, StateSlice};

/// Auth/session slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Bearer token for REST calls and the gateway handshake.
    pub token: Option<String>,
    /// The authenticated user.
    pub user: Option<UserSummary>,
}

/// UI overlay slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayState {
    /// Mail compose panel visibility.
    pub compose_open: bool,
    /// Profile pane visibility.
    pub profile_open: bool,
}

/// Transient placement-wizard slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    /// Current wizard step, None when the wizard is closed.
    pub step: Option<u32>,
    /// Name being drafted for the placement.
    pub draft_name: Option<String>,
}

/// The full client state record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientState {
    /// Auth/session data.
    pub session: SessionState,
    /// Overlay flags.
    pub overlays: OverlayState,
    /// Wizard state.
    pub wizard: WizardState,
}

/// Partial update for the session slice.
///
/// `None` fields are left untouched; `Some` fields replace the stored
/// value (including replacing it with nothing).
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    /// New token value, if present.
    pub token: Option<Option<String>>,
    /// New user value, if present.
    pub user: Option<Option<UserSummary>>,
}

impl SessionPatch {
    /// Empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the token.
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = Some(token);
        self
    }

    /// Set the user.
    pub fn user(mut self, user: Option<UserSummary>) -> Self {
        self.user = Some(user);
        self
    }
}

/// Partial update for the overlay slice.
#[derive(Debug, Clone, Default)]
pub struct OverlayPatch {
    /// New compose panel visibility, if present.
    pub compose_open: Option<bool>,
    /// New profile pane visibility, if present.
    pub profile_open: Option<bool>,
}

impl OverlayPatch {
    /// Empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set compose panel visibility.
    pub fn compose_open(mut self, open: bool) -> Self {
        self.compose_open = Some(open);
        self
    }

    /// Set profile pane visibility.
    pub fn profile_open(mut self, open: bool) -> Self {
        self.profile_open = Some(open);
        self
    }
}

/// Partial update for the wizard slice.
#[derive(Debug, Clone, Default)]
pub struct WizardPatch {
    /// New step, if present.
    pub step: Option<Option<u32>>,
    /// New draft name, if present.
    pub draft_name: Option<Option<String>>,
}

impl WizardPatch {
    /// Empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the step.
    pub fn step(mut self, step: Option<u32>) -> Self {
        self.step = Some(step);
        self
    }

    /// Set the draft name.
    pub fn draft_name(mut self, name: Option<String>) -> Self {
        self.draft_name = Some(name);
        self
    }
}

/// The client's single authoritative state record.
pub struct StateStore {
    state: Mutex<ClientState>,
    bus: Arc<EventBus>,
}

impl StateStore {
    /// Create a store publishing change events on the given bus.
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            state: Mutex::new(ClientState::default()),
            bus,
        }
    }

    /// A defensive copy of the full state.
    pub fn state(&self) -> ClientState {
        self.state.lock().expect("state lock poisoned").clone()
    }

    /// A defensive copy of the session slice.
    pub fn session(&self) -> SessionState {
        self.state().session
    }

    /// A defensive copy of the overlay slice.
    pub fn overlays(&self) -> OverlayState {
        self.state().overlays
    }

    /// A defensive copy of the wizard slice.
    pub fn wizard(&self) -> WizardState {
        self.state().wizard
    }

    /// Merge a session patch. Publishes a change event only if the slice
    /// actually changed.
    pub fn set_session_state(&self, patch: SessionPatch) {
        let changed = {
            let mut state = self.state.lock().expect("state lock poisoned");
            let mut next = state.session.clone();
            if let Some(token) = patch.token {
                next.token = token;
            }
            if let Some(user) = patch.user {
                next.user = user;
            }
            if next == state.session {
                false
            } else {
                state.session = next;
                true
            }
        };

        if changed {
            self.publish_change(StateSlice::Session);
        }
    }

    /// Merge an overlay patch. Publishes a change event only if the
    /// slice actually changed.
    pub fn set_overlay_state(&self, patch: OverlayPatch) {
        let changed = {
            let mut state = self.state.lock().expect("state lock poisoned");
            let mut next = state.overlays.clone();
            if let Some(open) = patch.compose_open {
                next.compose_open = open;
            }
            if let Some(open) = patch.profile_open {
                next.profile_open = open;
            }
            if next == state.overlays {
                false
            } else {
                state.overlays = next;
                true
            }
        };

        if changed {
            self.publish_change(StateSlice::Overlays);
        }
    }

    /// Merge a wizard patch. Publishes a change event only if the slice
    /// actually changed.
    pub fn set_wizard_state(&self, patch: WizardPatch) {
        let changed = {
            let mut state = self.state.lock().expect("state lock poisoned");
            let mut next = state.wizard.clone();
            if let Some(step) = patch.step {
                next.step = step;
            }
            if let Some(name) = patch.draft_name {
                next.draft_name = name;
            }
            if next == state.wizard {
                false
            } else {
                state.wizard = next;
                true
            }
        };

        if changed {
            self.publish_change(StateSlice::Wizard);
        }
    }

    /// Publish after the state lock has been released, so handlers can
    /// read the store.
    fn publish_change(&self, slice: StateSlice) {
        self.bus
            .publish(slice.topic(), &BusEvent::StateChanged { slice });
    }
}

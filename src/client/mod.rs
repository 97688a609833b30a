//! Client runtime for Plaza.
//!
//! The pieces a UI builds on: the state store (single authoritative
//! session/UI-state record), the event bus (synchronous in-process
//! publish/subscribe), and the realtime client (one authenticated
//! channel to the gateway). REST responses and gateway broadcasts both
//! funnel through the bus, which is how asynchronous completions stay
//! consistent with UI state.

pub mod bus;
pub mod realtime;
pub mod state;

pub use bus::{topics, BusEvent, EventBus, StateSlice, Subscription};
pub use realtime::RealtimeClient;
pub use state::{
    ClientState, OverlayPatch, OverlayState, SessionPatch, SessionState, StateStore, WizardPatch,
    WizardState,
};

//! Platform-agnostic front-end for the RAG assistant.
//!
//! [`Controller`] owns the application state and drives a [`Surface`]; the
//! browser and terminal shells only translate events into controller calls.

pub mod controller;
pub mod format;
pub mod markdown;
pub mod state;
pub mod surface;
pub mod toast;
pub mod transcript;
pub mod view;

pub use controller::{module_prompt, Controller, SendOutcome};
pub use state::{AppState, ConnectionStatus, Indicator, LoadState};
pub use surface::Surface;
pub use toast::{Toast, ToastKind, TOAST_FADE};
pub use transcript::{Transcript, TranscriptEntry};

pub mod backend;
pub mod dispatcher;
pub mod kind;
pub mod store;

#[cfg(feature = "input-enigo")]
pub use backend::EnigoBackend;
pub use backend::{ActionError, ClickKind, InputBackend, KeyName, LoggingBackend, ScreenshotCommand};
pub use dispatcher::{CooldownDispatcher, DEFAULT_COOLDOWN, DispatchOutcome, MIN_COOLDOWN, SCROLL_NOTCHES};
pub use kind::{ActionDescriptor, ActionParams, ActionType};
pub use store::{ActionStore, DEFAULT_ACTIONS_FILENAME, MappingInfo, StoreError};

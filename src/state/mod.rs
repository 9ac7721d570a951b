//! Client-side state: the observable store, the view model, and the
//! coordinator that mediates every transition through the transport.

pub mod coordinator;
pub mod store;
pub mod view;

pub use coordinator::{ChatCoordinator, NEW_CHAT_TITLE, NO_ACTIVE_SESSION};
pub use store::StateStore;
pub use view::{ChatView, TranscriptEntry};

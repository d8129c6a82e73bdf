//! Background-side message routing and the in-page sidebar of the browser extension.

pub mod identity;
pub mod message;
pub mod router;
pub mod sidebar;

pub use identity::{ConfiguredIdentity, IdentityProvider};
pub use message::{ExtensionError, ExtensionMessage, error_response};
pub use router::{Messenger, MessageRouter};
pub use sidebar::{EditorView, Pending, PendingKind, Sidebar, SidebarDriver, View, ViewToken};

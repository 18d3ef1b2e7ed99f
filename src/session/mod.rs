pub mod scope;
pub mod store;

pub use scope::{ScopedSession, SessionScope};
pub use store::{MemorySessionStore, SessionError, SessionStore};

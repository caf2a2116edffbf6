pub mod commands;
pub mod config;
pub mod input;
pub mod session;
pub mod store;

pub use config::EditorConfig;
pub use session::{EditorSession, Intent, SessionError};
pub use store::{DocumentStore, FileStore, MemoryStore, StoreError};

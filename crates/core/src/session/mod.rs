pub mod session;

pub use session::{SessionHandles, SyncSession};

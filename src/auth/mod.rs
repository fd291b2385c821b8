//! Roles, permissions and login throttling.

pub mod attempts;
pub mod role;

pub use attempts::{
    AttemptOutcome, AttemptPolicy, AttemptState, AttemptStore, AttemptTracker, JsonFileStore,
    MemoryStore,
};
pub use role::{authorize, Capability, Role};

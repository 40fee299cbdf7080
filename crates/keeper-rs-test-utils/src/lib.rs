//! Test helpers shared across Keeper crates.

pub mod clock;
pub mod context;
pub mod drafts;
pub mod storage;
pub mod tools;

pub use clock::FixedClock;
pub use context::{StoreFixture, base_tool_context};
pub use drafts::{memory_draft, rule_draft};
pub use storage::MemoryStorage;
pub use tools::DummyTool;

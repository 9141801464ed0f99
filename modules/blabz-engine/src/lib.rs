pub mod categorizer;
pub mod filter;
pub mod guard;
pub mod matcher;
pub mod pipeline;
pub mod scorer;
pub mod source;
pub use blabz_common::store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

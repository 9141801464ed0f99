pub mod config;
pub mod error;
pub mod policy;
pub mod store;
pub mod text;
pub mod types;

pub use config::Config;
pub use error::BlabzError;
pub use policy::PipelinePolicy;
pub use text::*;
pub use types::*;

mod embedders;
mod format_validator;
mod llm_client;
mod message;
mod mock;
mod providers;

pub use embedders::*;
pub use format_validator::*;
pub use llm_client::*;
pub use message::*;
pub use mock::*;

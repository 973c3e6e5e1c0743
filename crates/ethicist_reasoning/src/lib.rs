pub mod api_types;
pub mod dispatcher;
pub mod llm;
pub mod providers;
pub mod tools;

pub use dispatcher::{PreparedCall, ToolDispatcher};
pub use llm::{Completion, CompletionClient, CompletionParams, CompletionRequest};
pub use providers::create_client;

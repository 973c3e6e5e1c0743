pub mod config;
pub mod error;
pub mod knowledge;
pub mod prompts;
pub mod tools;

pub use config::EthicistConfig;
pub use error::{CompletionError, EthicistError};
pub use knowledge::{KnowledgeRegistry, ResourceEntry};
pub use prompts::{PromptDefinition, PromptRegistry, RenderedPrompt};
pub use tools::{ToolArgs, ToolDefinition, ToolResult, ToolSummary};

pub mod protocol;
pub mod server;
pub mod stdio;

pub use protocol::{JsonRpcError, JsonRpcId, JsonRpcRequest, JsonRpcResponse};
pub use server::McpServer;
pub use stdio::run_stdio;

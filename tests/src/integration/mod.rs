//! Integration flows.

pub mod api_flow;
pub mod rpc_flow;
pub mod sync_flow;

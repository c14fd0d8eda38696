//! HTTP 接口

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
mod router;
mod state;

pub use router::*;
pub use state::*;

//! tasker-auth-core - 认证核心库
//!
//! JWT 签发/校验、Claims、密码哈希

mod claims;
mod password;
mod token;

pub use claims::*;
pub use password::*;
pub use token::*;

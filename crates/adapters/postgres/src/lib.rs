//! tasker-adapter-postgres - PostgreSQL 适配器

mod account;
mod connection;
mod migration;
mod schema;
mod task;

pub use account::*;
pub use connection::*;
pub use migration::*;
pub use schema::*;
pub use task::*;

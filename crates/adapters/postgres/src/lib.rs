//! ditto-adapter-postgres - PostgreSQL 适配器

mod connection;
mod error;
mod resource;
mod store;

pub use connection::*;
pub use error::*;
pub use resource::*;
pub use store::*;

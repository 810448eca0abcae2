//! 持久化实现

mod postgres;
mod repository;

pub use postgres::*;
pub use repository::*;

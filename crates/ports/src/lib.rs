//! ports - 抽象 trait 层
//!
//! 定义资源存储访问器的契约

mod repository;

#[cfg(any(test, feature = "testing"))]
mod memory;

pub use repository::*;

#[cfg(any(test, feature = "testing"))]
pub use memory::*;

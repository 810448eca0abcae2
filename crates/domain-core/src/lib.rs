//! domain-core - 资源型实体的领域核心
//!
//! 定义所有对外以 external id 寻址、以状态位软删除、以稀疏合并更新的
//! 实体需要实现的 trait 及其配套值类型。

mod entity;
mod field;
mod filter;
mod merge;
mod status;
mod transfer;

pub use entity::*;
pub use field::*;
pub use filter::*;
pub use merge::*;
pub use status::*;
pub use transfer::*;

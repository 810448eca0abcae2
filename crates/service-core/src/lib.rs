//! service-core - 资源型实体的通用服务
//!
//! 在存储访问器之上提供 external id 寻址、稀疏合并更新与批量读取。

mod base;

pub use base::*;

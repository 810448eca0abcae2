//! printer-service - 打印机资源服务

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

// Proto generated code
pub mod proto {
    tonic::include_proto!("ditto.printer.v1");
}

/// gRPC 反射使用的文件描述符集
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("printer_descriptor");

//! 传输对象转换与二进制编解码

use chrono::{DateTime, Utc};
use ditto_errors::{AppError, AppResult};
use prost::Message;
use prost_types::Timestamp;

use crate::Resource;

/// 实体与其传输对象之间的转换
///
/// 传输对象只包含对外有意义的字段，不含内部主键与 owner。
pub trait Transferable: Resource + Sized {
    type Transfer: Message + Default + Clone;

    /// 实体到传输对象的完整映射
    fn to_transfer(&self) -> Self::Transfer;

    /// 用传输对象覆盖客户端可写字段
    ///
    /// 不修改内部主键、owner、时间戳和生命周期状态，这些由服务端维护。
    fn fill_from_transfer(&mut self, dto: &Self::Transfer);

    /// 由传输对象还原实体（包括 external id、状态与时间戳）
    fn from_transfer(dto: &Self::Transfer) -> Self;

    /// 经传输对象的 protobuf 编码序列化
    fn to_binary(&self) -> Vec<u8> {
        self.to_transfer().encode_to_vec()
    }

    fn from_binary(bytes: &[u8]) -> AppResult<Self> {
        let dto = Self::Transfer::decode(bytes)
            .map_err(|e| AppError::decode(format!("{}: {}", Self::NAME, e)))?;
        Ok(Self::from_transfer(&dto))
    }
}

/// DateTime 转换为 protobuf Timestamp
pub fn datetime_to_timestamp(dt: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: dt.timestamp(),
        nanos: dt.timestamp_subsec_nanos() as i32,
    }
}

/// protobuf Timestamp 转换为 DateTime，越界时返回 None
pub fn timestamp_to_datetime(ts: &Timestamp) -> Option<DateTime<Utc>> {
    let nanos = u32::try_from(ts.nanos).ok()?;
    DateTime::from_timestamp(ts.seconds, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_round_trip_keeps_nanos() {
        let now = Utc::now();
        let ts = datetime_to_timestamp(now);
        assert_eq!(timestamp_to_datetime(&ts), Some(now));
    }

    #[test]
    fn test_negative_nanos_rejected() {
        let ts = Timestamp { seconds: 0, nanos: -1 };
        assert_eq!(timestamp_to_datetime(&ts), None);
    }
}

//! 打印机实体

use std::fmt;

use chrono::{DateTime, Utc};
use ditto_domain_core::{
    FieldValue, Resource, ResourceMeta, ResourceStatus, Transferable, datetime_to_timestamp,
    merge_field, timestamp_to_datetime,
};
use ditto_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::proto::PrinterDto;

/// 打印机
///
/// `user_id` 是创建者，只在创建时由认证身份写入；序列号与产品号创建后不可变。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Printer {
    #[serde(flatten)]
    pub meta: ResourceMeta,
    pub name: String,
    pub user_id: String,
    pub serial_number: String,
    pub product_number: String,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub from_index: u64,
    pub to_index: u64,
    pub description: String,
}

/// 计数器落库为 BIGINT，超过此值无法存储
pub const MAX_INDEX: u64 = i64::MAX as u64;

impl Printer {
    /// 拒绝无法落库的计数器值
    pub fn validate(&self) -> AppResult<()> {
        for (column, value) in [("from_index", self.from_index), ("to_index", self.to_index)] {
            if value > MAX_INDEX {
                return Err(AppError::invalid_argument(format!(
                    "{} exceeds {}",
                    column, MAX_INDEX
                )));
            }
        }
        Ok(())
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    pub fn to_json(&self) -> AppResult<String> {
        serde_json::to_string(self).map_err(|e| AppError::internal(format!("printer to json: {}", e)))
    }
}

impl Resource for Printer {
    const NAME: &'static str = "printers";
    const FIELDS: &'static [&'static str] = &[
        "name",
        "user_id",
        "serial_number",
        "product_number",
        "from_date",
        "to_date",
        "from_index",
        "to_index",
        "description",
    ];

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ResourceMeta {
        &mut self.meta
    }

    fn merge(&mut self, patch: &Self) {
        merge_field(&mut self.name, &patch.name);
        merge_field(&mut self.description, &patch.description);
        merge_field(&mut self.from_index, &patch.from_index);
        merge_field(&mut self.to_index, &patch.to_index);
        merge_field(&mut self.from_date, &patch.from_date);
        merge_field(&mut self.to_date, &patch.to_date);
        self.meta.merge_lifecycle(&patch.meta);
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        let value = match column {
            "name" => self.name.as_str().into(),
            "user_id" => self.user_id.as_str().into(),
            "serial_number" => self.serial_number.as_str().into(),
            "product_number" => self.product_number.as_str().into(),
            "from_date" => self.from_date.into(),
            "to_date" => self.to_date.into(),
            "from_index" => FieldValue::Int(i64::try_from(self.from_index).ok()?),
            "to_index" => FieldValue::Int(i64::try_from(self.to_index).ok()?),
            "description" => self.description.as_str().into(),
            _ => return None,
        };
        Some(value)
    }
}

impl Transferable for Printer {
    type Transfer = PrinterDto;

    fn to_transfer(&self) -> PrinterDto {
        PrinterDto {
            external_id: self.meta.external_id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            serial_number: self.serial_number.clone(),
            product_number: self.product_number.clone(),
            from_date: self.from_date.map(datetime_to_timestamp),
            to_date: self.to_date.map(datetime_to_timestamp),
            from_index: self.from_index,
            to_index: self.to_index,
            status: i32::from(self.meta.status),
            created_at: Some(datetime_to_timestamp(self.meta.created_at)),
            updated_at: Some(datetime_to_timestamp(self.meta.updated_at)),
        }
    }

    fn fill_from_transfer(&mut self, dto: &PrinterDto) {
        self.name = dto.name.clone();
        self.description = dto.description.clone();
        self.serial_number = dto.serial_number.clone();
        self.product_number = dto.product_number.clone();
        self.from_date = dto.from_date.as_ref().and_then(timestamp_to_datetime);
        self.to_date = dto.to_date.as_ref().and_then(timestamp_to_datetime);
        self.from_index = dto.from_index;
        self.to_index = dto.to_index;
    }

    fn from_transfer(dto: &PrinterDto) -> Self {
        let mut printer = Printer::default();
        printer.fill_from_transfer(dto);
        printer.meta.external_id = dto.external_id.clone();
        printer.meta.status = ResourceStatus::from(dto.status);
        if let Some(created_at) = dto.created_at.as_ref().and_then(timestamp_to_datetime) {
            printer.meta.created_at = created_at;
        }
        if let Some(updated_at) = dto.updated_at.as_ref().and_then(timestamp_to_datetime) {
            printer.meta.updated_at = updated_at;
        }
        printer
    }
}

impl fmt::Display for Printer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"name\": \"{}\", \"description\": \"{}\", \"serial_number\": \"{}\", \"product_number\": \"{}\"}}",
            self.name, self.description, self.serial_number, self.product_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Printer {
        let mut printer = Printer {
            name: "HP-1".to_string(),
            user_id: "u1".to_string(),
            serial_number: "SN100".to_string(),
            product_number: "PN7".to_string(),
            from_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()),
            to_date: None,
            from_index: 10,
            to_index: 250,
            description: "second floor".to_string(),
            ..Default::default()
        };
        printer.meta.initialize("0190a3c4-printer".to_string(), Utc::now());
        printer
    }

    #[test]
    fn test_binary_round_trip_keeps_transfer_fields() {
        let printer = sample();
        let restored = Printer::from_binary(&printer.to_binary()).unwrap();

        assert_eq!(restored.external_id(), printer.external_id());
        assert_eq!(restored.name, printer.name);
        assert_eq!(restored.description, printer.description);
        assert_eq!(restored.serial_number, printer.serial_number);
        assert_eq!(restored.product_number, printer.product_number);
        assert_eq!(restored.from_date, printer.from_date);
        assert_eq!(restored.to_date, printer.to_date);
        assert_eq!(restored.from_index, printer.from_index);
        assert_eq!(restored.to_index, printer.to_index);
        assert_eq!(restored.meta.status, printer.meta.status);
        assert_eq!(restored.meta.created_at, printer.meta.created_at);
        assert_eq!(restored.meta.updated_at, printer.meta.updated_at);
        // 内部主键与 owner 不属于传输对象
        assert!(restored.user_id.is_empty());
        assert!(restored.meta.id.is_none());
    }

    #[test]
    fn test_from_binary_rejects_garbage() {
        let err = Printer::from_binary(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }

    #[test]
    fn test_fill_from_transfer_leaves_server_fields() {
        let mut printer = sample();
        let before = printer.meta.clone();
        let dto = PrinterDto {
            external_id: "spoofed".to_string(),
            name: "renamed".to_string(),
            status: 1,
            ..Default::default()
        };
        printer.fill_from_transfer(&dto);

        assert_eq!(printer.name, "renamed");
        assert_eq!(printer.meta, before);
        assert_eq!(printer.user_id, "u1");
    }

    #[test]
    fn test_merge_is_sparse() {
        let mut printer = sample();
        let patch = Printer {
            description: "broken".to_string(),
            to_index: 900,
            ..Default::default()
        };
        printer.merge(&patch);

        assert_eq!(printer.name, "HP-1");
        assert_eq!(printer.description, "broken");
        assert_eq!(printer.from_index, 10);
        assert_eq!(printer.to_index, 900);
        assert_eq!(printer.meta.status, ResourceStatus::Active);
    }

    #[test]
    fn test_merge_ignores_identity_fields() {
        let mut printer = sample();
        let patch = Printer {
            serial_number: "SN999".to_string(),
            product_number: "PN999".to_string(),
            user_id: "u2".to_string(),
            ..Default::default()
        };
        printer.merge(&patch);

        assert_eq!(printer.serial_number, "SN100");
        assert_eq!(printer.product_number, "PN7");
        assert_eq!(printer.user_id, "u1");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let patch = Printer {
            name: "HP-2".to_string(),
            from_date: Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let mut once = sample();
        once.merge(&patch);
        let mut twice = once.clone();
        twice.merge(&patch);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_deletion_patch_flips_status() {
        let mut printer = sample();
        let patch = Printer {
            meta: ResourceMeta::deletion_patch(Utc::now()),
            ..Default::default()
        };
        printer.merge(&patch);
        assert_eq!(printer.meta.status, ResourceStatus::Inactive);
        assert!(printer.meta.is_deleted());
        assert_eq!(printer.name, "HP-1");
    }

    #[test]
    fn test_display_and_json() {
        let printer = sample();
        let shown = printer.to_string();
        assert!(shown.contains("\"name\": \"HP-1\""));
        assert!(shown.contains("\"serial_number\": \"SN100\""));

        let json = printer.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "HP-1");
        assert_eq!(value["status"], "active");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_column_lookup() {
        let printer = sample();
        assert_eq!(printer.column("user_id"), Some(FieldValue::Text("u1".to_string())));
        assert_eq!(printer.column("from_index"), Some(FieldValue::Int(10)));
        assert_eq!(printer.column("to_date"), Some(FieldValue::Timestamp(None)));
        assert!(printer.column("colour").is_none());
    }

    #[test]
    fn test_index_beyond_bigint_is_rejected() {
        let mut printer = sample();
        printer.to_index = MAX_INDEX + 1;

        let err = printer.validate().unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert!(printer.column("to_index").is_none());

        printer.to_index = MAX_INDEX;
        assert!(printer.validate().is_ok());
        assert_eq!(printer.column("to_index"), Some(FieldValue::Int(i64::MAX)));
    }
}

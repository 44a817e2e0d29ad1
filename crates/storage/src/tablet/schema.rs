//! Tablet schema descriptors.
//!
//! The snapshot subsystem treats rows as opaque byte records; the schema
//! descriptor travels with headers so a restored tablet knows what it is
//! holding, but no columnar encoding happens at this layer.

use serde::{Deserialize, Serialize};

/// Column value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// Boolean.
    Bool,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit float.
    Float64,
    /// UTF-8 string.
    Utf8,
    /// Arbitrary bytes.
    Binary,
}

/// One column of a tablet schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,
    /// Value type.
    pub column_type: ColumnType,
    /// Whether NULL values are allowed.
    pub nullable: bool,
}

/// Schema descriptor for a tablet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabletSchema {
    /// Ordered column list; the first `key_column_count` are key columns.
    pub columns: Vec<ColumnSpec>,
    /// Number of leading key columns.
    pub key_column_count: u32,
}

impl TabletSchema {
    /// A small two-column schema for tests.
    pub fn for_testing() -> Self {
        TabletSchema {
            columns: vec![
                ColumnSpec {
                    name: "k".to_string(),
                    column_type: ColumnType::Int64,
                    nullable: false,
                },
                ColumnSpec {
                    name: "v".to_string(),
                    column_type: ColumnType::Binary,
                    nullable: true,
                },
            ],
            key_column_count: 1,
        }
    }
}

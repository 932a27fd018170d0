//! Column definitions for a table that has not been created yet.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Column data types offered by the table designer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "UUID")]
    Uuid,
    #[default]
    #[serde(rename = "VARCHAR(255)")]
    Varchar,
    #[serde(rename = "TEXT")]
    Text,
    #[serde(rename = "INTEGER")]
    Integer,
    #[serde(rename = "BIGINT")]
    BigInt,
    #[serde(rename = "BOOLEAN")]
    Boolean,
    #[serde(rename = "TIMESTAMP WITH TIME ZONE")]
    TimestampTz,
    #[serde(rename = "JSONB")]
    Jsonb,
    #[serde(rename = "ARRAY")]
    Array,
    #[serde(rename = "ENUM")]
    Enum,
}

impl DataType {
    /// Menu order.
    pub const ALL: [DataType; 10] = [
        Self::Uuid,
        Self::Varchar,
        Self::Text,
        Self::Integer,
        Self::BigInt,
        Self::Boolean,
        Self::TimestampTz,
        Self::Jsonb,
        Self::Array,
        Self::Enum,
    ];

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Uuid => "UUID",
            Self::Varchar => "VARCHAR(255)",
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Boolean => "BOOLEAN",
            Self::TimestampTz => "TIMESTAMP WITH TIME ZONE",
            Self::Jsonb => "JSONB",
            Self::Array => "ARRAY",
            Self::Enum => "ENUM",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Uuid => "Unique identifier.",
            Self::Varchar => "Short text up to 255 chars.",
            Self::Text => "Unlimited text.",
            Self::Integer => "Whole numbers.",
            Self::BigInt => "Large integers.",
            Self::Boolean => "True/false values.",
            Self::TimestampTz => "Date & time with timezone.",
            Self::Jsonb => "Semi-structured JSON data.",
            Self::Array => "Array of base type values.",
            Self::Enum => "Enum with predefined values.",
        }
    }

    /// Parse the SQL spelling, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_sql().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownDataType(s.to_string()))
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Constraint toggles, in the order the designer shows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    PrimaryKey,
    Unique,
    Nullable,
    Default,
    ForeignKey,
    Check,
}

impl Constraint {
    pub const ALL: [Constraint; 6] = [
        Self::PrimaryKey,
        Self::Unique,
        Self::Nullable,
        Self::Default,
        Self::ForeignKey,
        Self::Check,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::PrimaryKey => "Primary Key",
            Self::Unique => "Unique",
            Self::Nullable => "Allow Nulls",
            Self::Default => "Default Value",
            Self::ForeignKey => "Foreign Key",
            Self::Check => "Check Constraint",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::PrimaryKey => "Unique row identifier.",
            Self::Unique => "No duplicate values allowed.",
            Self::Nullable => "Can be empty (NULL).",
            Self::Default => "Auto-filled if none provided.",
            Self::ForeignKey => "References another table/column.",
            Self::Check => "Custom check expression.",
        }
    }

    /// Whether the toggle is currently enabled on `column`.
    pub fn is_set(&self, column: &ColumnDefinition) -> bool {
        match self {
            Self::PrimaryKey => column.is_primary_key,
            Self::Unique => column.is_unique,
            Self::Nullable => column.is_nullable,
            Self::Default => column.has_default,
            Self::ForeignKey => column.is_foreign_key,
            Self::Check => column.has_check,
        }
    }

    /// "Allow Nulls" cannot be edited while the column is a primary key.
    pub fn is_locked(&self, column: &ColumnDefinition) -> bool {
        matches!(self, Self::Nullable) && column.is_primary_key
    }

    /// The update that sets this toggle to `on`.
    pub fn update(&self, on: bool) -> ColumnUpdate {
        match self {
            Self::PrimaryKey => ColumnUpdate::PrimaryKey(on),
            Self::Unique => ColumnUpdate::Unique(on),
            Self::Nullable => ColumnUpdate::Nullable(on),
            Self::Default => ColumnUpdate::HasDefault(on),
            Self::ForeignKey => ColumnUpdate::ForeignKey(on),
            Self::Check => ColumnUpdate::HasCheck(on),
        }
    }
}

/// One column of a draft table. Every field stays editable until submission;
/// fields whose governing flag is off are only cleared by [`ColumnDefinition::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub base_type: String,
    pub enum_values: Vec<String>,
    pub is_primary_key: bool,
    pub is_unique: bool,
    pub is_nullable: bool,
    pub has_default: bool,
    pub default_value: String,
    pub has_check: bool,
    pub check: String,
    pub is_foreign_key: bool,
    pub references_table: String,
    pub references_column: String,
    pub on_delete: String,
    pub on_update: String,
}

impl Default for ColumnDefinition {
    fn default() -> Self {
        Self::new()
    }
}

/// A single-field edit. Each variant replaces exactly one field, except
/// `PrimaryKey(true)` which also clears `is_nullable`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value")]
pub enum ColumnUpdate {
    #[serde(rename = "name")]
    Name(String),
    #[serde(rename = "dataType")]
    DataType(DataType),
    #[serde(rename = "baseType")]
    BaseType(String),
    #[serde(rename = "enumValues")]
    EnumValues(Vec<String>),
    #[serde(rename = "isPrimaryKey")]
    PrimaryKey(bool),
    #[serde(rename = "isUnique")]
    Unique(bool),
    #[serde(rename = "isNullable")]
    Nullable(bool),
    #[serde(rename = "hasDefault")]
    HasDefault(bool),
    #[serde(rename = "defaultValue")]
    DefaultValue(String),
    #[serde(rename = "hasCheck")]
    HasCheck(bool),
    #[serde(rename = "check")]
    Check(String),
    #[serde(rename = "isForeignKey")]
    ForeignKey(bool),
    #[serde(rename = "referencesTable")]
    ReferencesTable(String),
    #[serde(rename = "referencesColumn")]
    ReferencesColumn(String),
    #[serde(rename = "onDelete")]
    OnDelete(String),
    #[serde(rename = "onUpdate")]
    OnUpdate(String),
}

impl ColumnUpdate {
    /// Enum values as typed into a comma-separated input. Empty entries are
    /// kept so the input round-trips while the user is still typing.
    pub fn enum_input(text: &str) -> Self {
        Self::EnumValues(text.split(',').map(str::to_string).collect())
    }
}

impl ColumnDefinition {
    /// A blank column: `VARCHAR(255)`, nullable, every other flag off.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            data_type: DataType::Varchar,
            base_type: String::new(),
            enum_values: Vec::new(),
            is_primary_key: false,
            is_unique: false,
            is_nullable: true,
            has_default: false,
            default_value: String::new(),
            has_check: false,
            check: String::new(),
            is_foreign_key: false,
            references_table: String::new(),
            references_column: String::new(),
            on_delete: String::new(),
            on_update: String::new(),
        }
    }

    /// Builder: named column.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new().set_field(ColumnUpdate::Name(name.into()))
    }

    /// Apply `update` and return the updated column.
    pub fn set_field(mut self, update: ColumnUpdate) -> Self {
        self.apply(update);
        self
    }

    pub fn apply(&mut self, update: ColumnUpdate) {
        match update {
            ColumnUpdate::Name(v) => self.name = v.to_lowercase(),
            ColumnUpdate::DataType(v) => self.data_type = v,
            ColumnUpdate::BaseType(v) => self.base_type = v,
            ColumnUpdate::EnumValues(v) => self.enum_values = v,
            ColumnUpdate::PrimaryKey(v) => {
                self.is_primary_key = v;
                if v {
                    self.is_nullable = false;
                }
            }
            ColumnUpdate::Unique(v) => self.is_unique = v,
            ColumnUpdate::Nullable(v) => self.is_nullable = v,
            ColumnUpdate::HasDefault(v) => self.has_default = v,
            ColumnUpdate::DefaultValue(v) => self.default_value = v,
            ColumnUpdate::HasCheck(v) => self.has_check = v,
            ColumnUpdate::Check(v) => self.check = v,
            ColumnUpdate::ForeignKey(v) => self.is_foreign_key = v,
            ColumnUpdate::ReferencesTable(v) => self.references_table = v,
            ColumnUpdate::ReferencesColumn(v) => self.references_column = v,
            ColumnUpdate::OnDelete(v) => self.on_delete = v,
            ColumnUpdate::OnUpdate(v) => self.on_update = v,
        }
    }

    /// Whether the column has a usable name.
    pub fn is_named(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Project onto the fields that are meaningful under the current flags and type.
    pub fn normalize(&self) -> NormalizedColumn {
        let fk = self.is_foreign_key;
        NormalizedColumn {
            name: self.name.to_lowercase(),
            data_type: self.data_type,
            base_type: (self.data_type == DataType::Array).then(|| self.base_type.clone()),
            enum_values: (self.data_type == DataType::Enum).then(|| {
                self.enum_values
                    .iter()
                    .filter(|v| !v.is_empty())
                    .cloned()
                    .collect()
            }),
            is_primary_key: self.is_primary_key,
            is_unique: self.is_unique,
            is_nullable: self.is_nullable,
            has_default: self.has_default,
            default_value: self.has_default.then(|| self.default_value.clone()),
            has_check: self.has_check,
            check: self.has_check.then(|| self.check.clone()),
            is_foreign_key: fk,
            references_table: fk.then(|| self.references_table.clone()),
            references_column: fk.then(|| self.references_column.clone()),
            on_delete: fk.then(|| self.on_delete.clone()),
            on_update: fk.then(|| self.on_update.clone()),
        }
    }
}

/// Submission-ready column. Inapplicable fields are `null` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedColumn {
    pub name: String,
    pub data_type: DataType,
    pub base_type: Option<String>,
    pub enum_values: Option<Vec<String>>,
    pub is_primary_key: bool,
    pub is_unique: bool,
    pub is_nullable: bool,
    pub has_default: bool,
    pub default_value: Option<String>,
    pub has_check: bool,
    pub check: Option<String>,
    pub is_foreign_key: bool,
    pub references_table: Option<String>,
    pub references_column: Option<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

impl NormalizedColumn {
    /// Back to an editable column, filling cleared fields with blanks.
    pub fn into_definition(self) -> ColumnDefinition {
        ColumnDefinition {
            name: self.name,
            data_type: self.data_type,
            base_type: self.base_type.unwrap_or_default(),
            enum_values: self.enum_values.unwrap_or_default(),
            is_primary_key: self.is_primary_key,
            is_unique: self.is_unique,
            is_nullable: self.is_nullable,
            has_default: self.has_default,
            default_value: self.default_value.unwrap_or_default(),
            has_check: self.has_check,
            check: self.check.unwrap_or_default(),
            is_foreign_key: self.is_foreign_key,
            references_table: self.references_table.unwrap_or_default(),
            references_column: self.references_column.unwrap_or_default(),
            on_delete: self.on_delete.unwrap_or_default(),
            on_update: self.on_update.unwrap_or_default(),
        }
    }
}

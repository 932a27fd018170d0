//! Table drafts and the requests built from them.

use serde::{Deserialize, Serialize};

use crate::column::{ColumnDefinition, ColumnUpdate, NormalizedColumn};
use crate::error::ValidationError;

/// An unsaved table: a name plus its column definitions in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDraft {
    #[serde(default)]
    pub table_name: String,
    #[serde(default = "blank_columns")]
    pub columns: Vec<ColumnDefinition>,
}

fn blank_columns() -> Vec<ColumnDefinition> {
    vec![ColumnDefinition::new()]
}

impl Default for TableDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// Body of a table-creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableRequest {
    pub table_name: String,
    pub columns: Vec<NormalizedColumn>,
}

impl TableDraft {
    /// A fresh draft with one blank column.
    pub fn new() -> Self {
        Self {
            table_name: String::new(),
            columns: blank_columns(),
        }
    }

    pub fn add_column(&mut self) -> usize {
        self.columns.push(ColumnDefinition::new());
        self.columns.len() - 1
    }

    /// Remove the column at `index`. The last remaining column is never removed.
    pub fn remove_column(&mut self, index: usize) -> bool {
        if self.columns.len() <= 1 || index >= self.columns.len() {
            return false;
        }
        self.columns.remove(index);
        true
    }

    pub fn update_column(
        &mut self,
        index: usize,
        update: ColumnUpdate,
    ) -> Result<&ColumnDefinition, ValidationError> {
        let column = self
            .columns
            .get_mut(index)
            .ok_or(ValidationError::UnknownColumn(index))?;
        column.apply(update);
        Ok(column)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Validate the draft and build the creation request. Unnamed columns are
    /// left out; the draft itself is not modified.
    pub fn build_create_table_request(&self) -> Result<CreateTableRequest, ValidationError> {
        if self.table_name.trim().is_empty() {
            return Err(ValidationError::EmptyTableName);
        }

        let columns: Vec<NormalizedColumn> = self
            .columns
            .iter()
            .filter(|c| c.is_named())
            .map(ColumnDefinition::normalize)
            .collect();

        if columns.is_empty() {
            return Err(ValidationError::NoNamedColumns);
        }

        Ok(CreateTableRequest {
            table_name: self.table_name.clone(),
            columns,
        })
    }
}

/// Gate in front of a table deletion: the user has to type the table's exact name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    table_name: String,
    typed: String,
}

impl DeleteConfirmation {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            typed: String::new(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn type_name(&mut self, typed: impl Into<String>) {
        self.typed = typed.into();
    }

    pub fn is_confirmed(&self) -> bool {
        self.typed == self.table_name
    }

    /// The confirmed table name, or a mismatch error.
    pub fn confirm(&self) -> Result<&str, ValidationError> {
        if self.is_confirmed() {
            Ok(&self.table_name)
        } else {
            Err(ValidationError::ConfirmationMismatch)
        }
    }
}

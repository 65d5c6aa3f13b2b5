//! # Table Schemas
//!
//! The engine never reflects over ORM models. Each table is described once by an
//! explicit [`TableSchema`]: its ordered columns, primary key and the
//! relationships it declares. Schemas are collected in a [`SchemaRegistry`] so
//! that relationship targets can be resolved by name.
//!
//! ```rust,ignore
//! let registry = SchemaRegistry::new()
//!     .with_table(
//!         TableSchema::new("account")
//!             .with_column(Column::new("id", LogicalType::Integer))
//!             .with_column(Column::new("name", LogicalType::String))
//!             .with_primary_key(["id"]),
//!     )
//!     .with_table(
//!         TableSchema::new("blog_post")
//!             .with_column(Column::new("id", LogicalType::Integer))
//!             .with_column(Column::new("account_id", LogicalType::Integer))
//!             .with_primary_key(["id"]),
//!     )
//!     .link("account", "id", "blog_post", "account_id");
//! registry.validate()?;
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::errors::ApiError;
use crate::response::RELATIONSHIP_KEY;

/// Logical type of a column, which decides how query-string values are coerced
/// and which filter families apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    Integer,
    Float,
    String,
    Boolean,
    Date,
    DateTime,
    Uuid,
}

impl LogicalType {
    /// Numeric and temporal columns accept `____from` / `____to` bounds.
    #[must_use]
    pub const fn supports_range(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Float | Self::Date | Self::DateTime
        )
    }

    /// Only string columns accept `____str`.
    #[must_use]
    pub const fn supports_string_match(self) -> bool {
        matches!(self, Self::String)
    }

    /// Human readable name used in decode error messages
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Integer => "an integer",
            Self::Float => "a number",
            Self::String => "a string",
            Self::Boolean => "a boolean",
            Self::Date => "a date (YYYY-MM-DD)",
            Self::DateTime => "a date-time (YYYY-MM-DDTHH:MM:SS)",
            Self::Uuid => "a UUID",
        }
    }
}

/// Column descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub logical_type: LogicalType,
    #[serde(default)]
    pub nullable: bool,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            nullable: false,
        }
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A declared foreign-key linkage, named by the target table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Name used in the `relationship` query parameter and the response map
    pub name: String,
    pub target_table: String,
    /// Column on the declaring table
    pub local_column: String,
    /// Column on the target table
    pub target_column: String,
}

impl Relationship {
    /// Relationship named after its target table.
    #[must_use]
    pub fn new(
        target_table: impl Into<String>,
        local_column: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        let target_table = target_table.into();
        Self {
            name: target_table.clone(),
            target_table,
            local_column: local_column.into(),
            target_column: target_column.into(),
        }
    }

    /// The same join-key pair traversed from the target back to `source_table`.
    #[must_use]
    pub fn reversed(&self, source_table: &str) -> Self {
        Self::new(source_table, &self.target_column, &self.local_column)
    }
}

/// Explicit description of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl TableSchema {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            relationships: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|rel| rel.name == name)
    }

    /// The relationship on this table whose target is `table`, if exactly one exists.
    #[must_use]
    pub fn relationship_to(&self, table: &str) -> Option<&Relationship> {
        let mut candidates = self
            .relationships
            .iter()
            .filter(|rel| rel.target_table == table);
        let first = candidates.next()?;
        candidates.next().is_none().then_some(first)
    }

    /// The single primary-key column, when the key is not composite.
    #[must_use]
    pub fn single_primary_key(&self) -> Option<&Column> {
        match self.primary_key.as_slice() {
            [only] => self.column(only),
            _ => None,
        }
    }

    /// Structural problems local to this table.
    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                problems.push(format!("{}: duplicate column '{}'", self.name, column.name));
            }
            if column.name == RELATIONSHIP_KEY {
                problems.push(format!(
                    "{}: column name '{RELATIONSHIP_KEY}' is reserved for expanded rows",
                    self.name
                ));
            }
        }
        if self.primary_key.is_empty() {
            problems.push(format!("{}: no primary key", self.name));
        }
        for key in &self.primary_key {
            if self.column(key).is_none() {
                problems.push(format!("{}: primary key column '{key}' is not declared", self.name));
            }
        }
        let mut names = HashSet::new();
        for rel in &self.relationships {
            if !names.insert(rel.name.as_str()) {
                problems.push(format!("{}: relationship '{}' declared twice", self.name, rel.name));
            }
            if self.column(&rel.local_column).is_none() {
                problems.push(format!(
                    "{}: relationship '{}' uses unknown column '{}'",
                    self.name, rel.name, rel.local_column
                ));
            }
        }
        problems
    }
}

/// All tables known to an engine, keyed by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaRegistry {
    tables: BTreeMap<String, TableSchema>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.register(table);
        self
    }

    pub fn register(&mut self, table: TableSchema) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Declare a relationship in both directions over the pair `(left.left_column, right.right_column)`.
    ///
    /// Unknown tables are left untouched here and reported by [`validate`](Self::validate).
    #[must_use]
    pub fn link(
        mut self,
        left: &str,
        left_column: &str,
        right: &str,
        right_column: &str,
    ) -> Self {
        let forward = Relationship::new(right, left_column, right_column);
        let backward = forward.reversed(left);
        if let Some(table) = self.tables.get_mut(left) {
            table.relationships.push(forward);
        }
        if let Some(table) = self.tables.get_mut(right) {
            table.relationships.push(backward);
        }
        self
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    /// Look up a table, treating an unknown name as a missing resource.
    ///
    /// # Errors
    /// Returns `ApiError::NotFound` if no table with that name is registered.
    pub fn require(&self, name: &str) -> Result<&TableSchema, ApiError> {
        self.table(name)
            .ok_or_else(|| ApiError::not_found(name, None))
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }

    /// Check that every relationship resolves to exactly one table and one
    /// existing join-key pair.
    ///
    /// # Errors
    /// Returns `ApiError::Internal` listing every problem found.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut problems = Vec::new();
        for table in self.tables.values() {
            problems.extend(table.problems());
            for rel in &table.relationships {
                match self.tables.get(&rel.target_table) {
                    None => problems.push(format!(
                        "{}: relationship '{}' targets unknown table '{}'",
                        table.name, rel.name, rel.target_table
                    )),
                    Some(target) if target.column(&rel.target_column).is_none() => {
                        problems.push(format!(
                            "{}: relationship '{}' targets unknown column '{}.{}'",
                            table.name, rel.name, rel.target_table, rel.target_column
                        ));
                    }
                    Some(target) => {
                        let local = table.column(&rel.local_column).map(|c| c.logical_type);
                        let remote = target.column(&rel.target_column).map(|c| c.logical_type);
                        if local.is_some() && local != remote {
                            problems.push(format!(
                                "{}: relationship '{}' joins columns of different types",
                                table.name, rel.name
                            ));
                        }
                    }
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ApiError::internal(
                "Invalid schema registry",
                Some(problems.join("; ")),
            ))
        }
    }
}

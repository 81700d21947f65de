//! Field metadata lookup. A filter leaf names a field by path; a
//! [`FieldResolver`] turns that path into a type and a column to filter on.

use crate::{
    error::{FieldResolutionError, FilterError},
    filter::value::literal,
};
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};
use planner::query::{
    ast::{
        common::{JoinKind, TableRef},
        expr::{BinaryOperator, Expr, Ident},
        select::Select,
    },
    builder::select::SelectBuilder,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Separator between relation names in a field path: `customer__name`.
pub const PATH_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number,
    Date,
    DateTime,
    Boolean,
    ForeignKey,
    User,
    MultipleChoice,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::DateTime => "date_time",
            FieldKind::Boolean => "boolean",
            FieldKind::ForeignKey => "foreign_key",
            FieldKind::User => "user",
            FieldKind::MultipleChoice => "multiple_choice",
        }
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, FieldKind::Date | FieldKind::DateTime)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub path: String,
    pub kind: FieldKind,
    pub column: Ident,
    pub nullable: bool,
}

impl ResolvedField {
    pub fn expr(&self) -> Expr {
        Expr::Identifier(self.column.clone())
    }
}

pub trait FieldResolver {
    fn resolve(&self, path: &str) -> Result<ResolvedField, FieldResolutionError>;
}

impl<F> FieldResolver for F
where
    F: Fn(&str) -> Result<ResolvedField, FieldResolutionError>,
{
    fn resolve(&self, path: &str) -> Result<ResolvedField, FieldResolutionError> {
        self(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub kind: FieldKind,
    /// Column name, when it differs from the field name.
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Column on the parent table holding the key.
    pub local_column: String,
    #[serde(default = "default_remote_column")]
    pub remote_column: String,
    #[serde(flatten)]
    pub catalog: FieldCatalog,
}

fn default_remote_column() -> String {
    "id".to_string()
}

/// A static description of a table, its fields and the relations reachable
/// from it. Usually loaded from a JSON schema file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCatalog {
    pub table: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDef>,
    #[serde(default)]
    pub relations: BTreeMap<String, Relation>,
}

impl FieldCatalog {
    pub fn new(table: &str) -> Self {
        FieldCatalog {
            table: table.to_string(),
            schema: None,
            fields: BTreeMap::new(),
            relations: BTreeMap::new(),
        }
    }

    pub fn field(mut self, name: &str, kind: FieldKind, nullable: bool) -> Self {
        let def = FieldDef {
            kind,
            column: None,
            nullable,
        };
        self.fields.insert(name.to_string(), def);
        self
    }

    pub fn relation(mut self, name: &str, local_column: &str, catalog: FieldCatalog) -> Self {
        let relation = Relation {
            local_column: local_column.to_string(),
            remote_column: default_remote_column(),
            catalog,
        };
        self.relations.insert(name.to_string(), relation);
        self
    }

    pub fn table_ref(&self) -> TableRef {
        TableRef {
            schema: self.schema.clone(),
            name: self.table.clone(),
        }
    }

    /// `SELECT *` from the base table, left-joining every relation under its
    /// path alias, filtered by `predicate`.
    pub fn select(&self, predicate: Option<Expr>) -> Select {
        let mut builder = SelectBuilder::new()
            .select(vec![Expr::Wildcard])
            .from(self.table_ref(), None);

        for (alias, parent, relation) in self.joins() {
            let on = Expr::binary(
                Expr::Identifier(Ident::new(Some(parent.as_str()), &relation.local_column)),
                BinaryOperator::Eq,
                Expr::Identifier(Ident::new(Some(alias.as_str()), &relation.remote_column)),
            );
            builder = builder.join(JoinKind::Left, relation.catalog.table_ref(), Some(alias.as_str()), on);
        }

        builder.filter(predicate).build()
    }

    /// Builds a row from a flat JSON object keyed the way the joined query
    /// names its columns (`status`, `customer.name`), typing each value by
    /// its field kind. Keys the catalog does not know keep their JSON type.
    pub fn row_from_json(
        &self,
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<RowData, FilterError> {
        let field_values = object
            .iter()
            .map(|(key, raw)| {
                let value = match self.column_kind(key) {
                    Some(kind) => literal(key, kind, raw)?,
                    None => Value::from_json(raw),
                };
                Ok(FieldValue::new(key, value))
            })
            .collect::<Result<Vec<_>, FilterError>>()?;
        Ok(RowData::new(&self.table, field_values))
    }

    fn column_kind(&self, key: &str) -> Option<FieldKind> {
        let (qualifier, column) = match key.rsplit_once('.') {
            Some((qualifier, column)) => (Some(qualifier), column),
            None => (None, key),
        };

        let mut catalog = self;
        if let Some(alias) = qualifier.filter(|q| *q != self.table) {
            for name in alias.split(PATH_SEPARATOR) {
                catalog = &catalog.relations.get(name)?.catalog;
            }
        }
        catalog
            .fields
            .iter()
            .find(|(name, def)| def.column.as_deref().unwrap_or(name.as_str()) == column)
            .map(|(_, def)| def.kind)
    }

    /// Every relation, depth first, as `(alias, parent alias, relation)`.
    fn joins(&self) -> Vec<(String, String, &Relation)> {
        let mut joins = Vec::new();
        self.collect_joins(None, &self.table, &mut joins);
        joins
    }

    fn collect_joins<'a>(
        &'a self,
        prefix: Option<&str>,
        parent: &str,
        joins: &mut Vec<(String, String, &'a Relation)>,
    ) {
        for (name, relation) in &self.relations {
            let alias = match prefix {
                Some(prefix) => format!("{prefix}{PATH_SEPARATOR}{name}"),
                None => name.clone(),
            };
            joins.push((alias.clone(), parent.to_string(), relation));
            relation.catalog.collect_joins(Some(&alias), &alias, joins);
        }
    }
}

impl FieldResolver for FieldCatalog {
    fn resolve(&self, path: &str) -> Result<ResolvedField, FieldResolutionError> {
        let parts: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        let Some((field_name, relations)) = parts.split_last() else {
            return Err(FieldResolutionError::UnknownField {
                path: path.to_string(),
            });
        };

        let mut catalog = self;
        let mut alias: Option<String> = None;
        for name in relations {
            let relation = catalog
                .relations
                .get(*name)
                .ok_or_else(|| FieldResolutionError::UnknownRelation {
                    name: name.to_string(),
                })?;
            alias = Some(match alias {
                Some(parent) => format!("{parent}{PATH_SEPARATOR}{name}"),
                None => name.to_string(),
            });
            catalog = &relation.catalog;
        }
        let qualifier = alias.as_deref().unwrap_or(&self.table);

        let def = catalog
            .fields
            .get(*field_name)
            .ok_or_else(|| FieldResolutionError::UnknownField {
                path: path.to_string(),
            })?;

        Ok(ResolvedField {
            path: path.to_string(),
            kind: def.kind,
            column: Ident::new(Some(qualifier), def.column.as_deref().unwrap_or(*field_name)),
            // a missing related row reads as NULL
            nullable: def.nullable || !relations.is_empty(),
        })
    }
}

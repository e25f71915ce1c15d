//! Field schema: canonical field names and the aliases users may type.
//!
//! The schema resource is a map from canonical field name to a list of
//! aliases, e.g.
//!
//! ```json
//! {"Location": ["location", "loc", "l"], "Rates": ["rates", "r"]}
//! ```
//!
//! It is loaded once at startup and never mutated. Alias resolution is
//! case-insensitive and walks the canonical fields in declared order, so if
//! two fields share an alias the first one wins. Such overlaps are reported
//! by [`FieldSchema::ambiguous_aliases`] and logged when the schema loads.

use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::error::{SchemaError, StoreError};
use crate::types::record::{OrderedPairs, Record};


/// One canonical field and its accepted aliases (stored lowercased).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub aliases: Vec<String>,
}


/// Immutable, ordered alias table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    fields: Vec<FieldDef>,
}


/// The raw resource shape, deserialized with key order preserved.
struct SchemaDoc(Vec<(String, Vec<String>)>);

impl<'de> Deserialize<'de> for SchemaDoc {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_map(OrderedPairs::<Vec<String>>::new("a field-to-aliases map"))
            .map(SchemaDoc)
    }
}


impl FieldSchema {
    /// Build a schema from `(canonical, aliases)` pairs in declaration order.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        let mut fields: Vec<FieldDef> = Vec::new();
        for (name, aliases) in pairs {
            let name = name.into();
            if fields.iter().any(|f| f.name == name) {
                return Err(SchemaError::DuplicateField(name));
            }
            let aliases = aliases
                .into_iter()
                .map(|a| Into::<String>::into(a).trim().to_lowercase())
                .filter(|a| !a.is_empty())
                .collect();
            fields.push(FieldDef { name, aliases });
        }
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }

        let schema = FieldSchema { fields };
        for (alias, owners) in schema.ambiguous_aliases() {
            warn!(
                alias = %alias,
                fields = ?owners,
                "alias shared by several fields; first declared field wins"
            );
        }
        Ok(schema)
    }

    /// Parse a JSON schema resource.
    pub fn from_json_str(content: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDoc = serde_json::from_str(content)?;
        Self::from_pairs(doc.0)
    }

    /// Parse a YAML schema resource.
    pub fn from_yaml_str(content: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDoc = serde_yaml::from_str(content)?;
        Self::from_pairs(doc.0)
    }

    /// Load the schema resource from disk. `.yaml`/`.yml` files are read
    /// as YAML, everything else as JSON.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_yaml = path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Resolve a user-typed alias to its canonical field name.
    pub fn resolve(&self, alias: &str) -> Result<&str, StoreError> {
        let needle = alias.to_lowercase();
        self.fields
            .iter()
            .find(|f| f.aliases.iter().any(|a| *a == needle))
            .map(|f| f.name.as_str())
            .ok_or_else(|| StoreError::FieldNotFound(alias.to_string()))
    }

    /// Canonical field names in declared order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// True if `name` is a canonical field of this schema.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// A record with every schema field present and empty.
    pub fn new_record(&self) -> Record {
        Record::with_fields(self.field_names())
    }

    /// Aliases accepted by more than one field, with the owning fields in
    /// declared order.
    pub fn ambiguous_aliases(&self) -> Vec<(String, Vec<String>)> {
        let mut out: Vec<(String, Vec<String>)> = Vec::new();
        for field in &self.fields {
            for alias in &field.aliases {
                let owners: Vec<String> = self
                    .fields
                    .iter()
                    .filter(|f| f.aliases.contains(alias))
                    .map(|f| f.name.clone())
                    .collect();
                if owners.len() > 1 && !out.iter().any(|(a, _)| a == alias) {
                    out.push((alias.clone(), owners));
                }
            }
        }
        out
    }
}

//! A named set of schemas defined from JSON.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use thiserror::Error;
use tracing::debug;

use crate::{
    errors::{DefinitionReason, SchemaDefinitionError},
    field::{Field, FieldType},
    schema::{MAX_NESTING_DEPTH, Schema},
    serde::{FieldDef, SchemaDefs, StructureDef},
};

/// Errors produced by [Registry::from_json].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The document is not valid JSON or does not match [SchemaDefs].
    #[error("invalid schema document: {0}")]
    Json(String),
    #[error(transparent)]
    Definition(#[from] SchemaDefinitionError),
}

/// Compiled schemas by structure name.
///
/// Nested `structure` references are resolved by name, in dependency order, so
/// a structure may be declared after the structures that embed it.
#[derive(Debug, Default)]
pub struct Registry {
    schemas: BTreeMap<String, Arc<Schema>>,
}

impl Registry {
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let defs: SchemaDefs =
            serde_json::from_str(json).map_err(|e| RegistryError::Json(e.to_string()))?;
        Ok(Registry::try_from(defs)?)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }

    /// Defined structure names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl TryFrom<SchemaDefs> for Registry {
    type Error = SchemaDefinitionError;

    fn try_from(value: SchemaDefs) -> Result<Self, Self::Error> {
        let mut by_name: HashMap<&str, &StructureDef> = HashMap::with_capacity(value.structures.len());
        for def in &value.structures {
            if by_name.insert(def.name.as_str(), def).is_some() {
                return Err(SchemaDefinitionError::new(
                    &def.name,
                    &def.name,
                    DefinitionReason::DuplicateStructure,
                ));
            }
        }

        let mut resolver = Resolver {
            by_name,
            built: BTreeMap::new(),
            visiting: Vec::new(),
        };
        for def in &value.structures {
            resolver.build(def)?;
        }

        debug!(structures = resolver.built.len(), "schema registry defined");

        Ok(Registry {
            schemas: resolver.built,
        })
    }
}

struct Resolver<'a> {
    by_name: HashMap<&'a str, &'a StructureDef>,
    built: BTreeMap<String, Arc<Schema>>,
    /// Structures currently being defined, outermost first.
    visiting: Vec<&'a str>,
}

impl<'a> Resolver<'a> {
    fn build(&mut self, def: &'a StructureDef) -> Result<Arc<Schema>, SchemaDefinitionError> {
        if let Some(schema) = self.built.get(&def.name) {
            return Ok(Arc::clone(schema));
        }

        self.visiting.push(def.name.as_str());

        let mut fields = Vec::with_capacity(def.fields.len());
        for field in &def.fields {
            let ty = self.field_type(def, field)?;

            fields.push(Field {
                name: field.name.clone(),
                ty,
                array_len: field.length,
            });
        }

        self.visiting.pop();

        let schema = Arc::new(Schema::define(&def.name, &fields)?);
        self.built.insert(def.name.clone(), Arc::clone(&schema));

        Ok(schema)
    }

    fn field_type(
        &mut self,
        def: &'a StructureDef,
        field: &'a FieldDef,
    ) -> Result<FieldType, SchemaDefinitionError> {
        let invalid = |reason| SchemaDefinitionError::new(&def.name, &field.name, reason);

        match (field.kind, &field.structure, field.bytes) {
            (Some(kind), None, None) => Ok(FieldType::Scalar(kind)),
            (None, Some(name), None) => {
                if self.visiting.contains(&name.as_str()) {
                    return Err(invalid(DefinitionReason::CyclicStructure(name.clone())));
                }

                if let Some(schema) = self.built.get(name) {
                    return Ok(FieldType::Struct(Arc::clone(schema)));
                }
                if self.visiting.len() >= MAX_NESTING_DEPTH {
                    return Err(invalid(DefinitionReason::NestingTooDeep));
                }

                let target = *self
                    .by_name
                    .get(name.as_str())
                    .ok_or_else(|| invalid(DefinitionReason::UnknownStructure(name.clone())))?;

                Ok(FieldType::Struct(self.build(target)?))
            }
            (None, None, Some(len)) => Ok(FieldType::Bytes(len)),
            (None, None, None) => Err(invalid(DefinitionReason::InvalidFieldKind)),
            _ => Err(invalid(DefinitionReason::ConflictingInterpretation)),
        }
    }
}

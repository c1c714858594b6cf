use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::{
        field::{FieldKind, FieldType},
        join::{ParentIdField, ParentJoinField},
    },
};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;

///
/// SchemaError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("field name must not be empty")]
    EmptyFieldName,

    #[error("field [{0}] is defined more than once")]
    DuplicateField(String),

    #[error("only one join field is allowed per index, found [{first}] and [{second}]")]
    MultipleJoinFields { first: String, second: String },

    #[error("join field [{0}] must declare at least one relation")]
    EmptyRelations(String),

    #[error("relation [{parent}] in join field [{join}] must declare at least one child")]
    NoChildren { join: String, parent: String },

    #[error("cannot have multiple parents with the same name [{0}]")]
    DuplicateParent(String),

    #[error("child [{child}] cannot have more than one parent, found [{first}] and [{second}]")]
    MultipleParents {
        child: String,
        first: String,
        second: String,
    },

    #[error("relation [{0}] cannot be its own child")]
    SelfReference(String),
}

impl From<SchemaError> for InternalError {
    fn from(err: SchemaError) -> Self {
        Self::new(ErrorClass::InvalidArgument, ErrorOrigin::Schema, err.to_string())
    }
}

///
/// IndexSchema
///
/// Field mappings of one index. The join field, when present, is unique
/// for the index, so lookup needs no key.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexSchema {
    index: String,
    fields: BTreeMap<String, FieldType>,
    join: Option<ParentJoinField>,
}

impl IndexSchema {
    pub fn builder(index: impl Into<String>) -> IndexSchemaBuilder {
        IndexSchemaBuilder::new(index)
    }

    /// An index with no mapped fields at all.
    pub fn empty(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            fields: BTreeMap::new(),
            join: None,
        }
    }

    #[must_use]
    pub fn index_name(&self) -> &str {
        &self.index
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldType> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldType> {
        self.fields.values()
    }

    /// Return the join declaration of this index, if any.
    #[must_use]
    pub const fn join_field(&self) -> Option<&ParentJoinField> {
        self.join.as_ref()
    }
}

///
/// IndexSchemaBuilder
///

#[derive(Debug)]
pub struct IndexSchemaBuilder {
    index: String,
    fields: Vec<(String, FieldKind)>,
    joins: Vec<(String, Vec<(String, Vec<String>)>)>,
}

impl IndexSchemaBuilder {
    fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            fields: Vec::new(),
            joins: Vec::new(),
        }
    }

    /// Map a plain field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push((name.into(), kind));
        self
    }

    /// Declare a join field with `(parent, children)` relations.
    #[must_use]
    pub fn join_field<P, C, I>(mut self, name: impl Into<String>, relations: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let relations = relations
            .into_iter()
            .map(|(parent, children)| {
                (
                    parent.into(),
                    children.into_iter().map(Into::into).collect::<Vec<_>>(),
                )
            })
            .collect();
        self.joins.push((name.into(), relations));
        self
    }

    pub fn build(self) -> Result<IndexSchema, SchemaError> {
        let mut fields = BTreeMap::new();
        for (name, kind) in self.fields {
            insert_field(&mut fields, FieldType::new(name, kind))?;
        }

        let mut joins = self.joins.into_iter();
        let join = match joins.next() {
            None => None,
            Some((name, relations)) => {
                if let Some((second, _)) = joins.next() {
                    return Err(SchemaError::MultipleJoinFields {
                        first: name,
                        second,
                    });
                }

                let join = build_join_field(name, relations)?;
                insert_field(&mut fields, join.field_type())?;
                for id_field in join.parent_id_fields() {
                    insert_field(&mut fields, id_field.field_type())?;
                }

                Some(join)
            }
        };

        Ok(IndexSchema {
            index: self.index,
            fields,
            join,
        })
    }
}

fn insert_field(
    fields: &mut BTreeMap<String, FieldType>,
    field: FieldType,
) -> Result<(), SchemaError> {
    if field.name().is_empty() {
        return Err(SchemaError::EmptyFieldName);
    }
    if fields.contains_key(field.name()) {
        return Err(SchemaError::DuplicateField(field.name().to_string()));
    }
    fields.insert(field.name().to_string(), field);

    Ok(())
}

// Validate relations and produce one parent-id field per parent.
fn build_join_field(
    name: String,
    relations: Vec<(String, Vec<String>)>,
) -> Result<ParentJoinField, SchemaError> {
    if name.is_empty() {
        return Err(SchemaError::EmptyFieldName);
    }
    if relations.is_empty() {
        return Err(SchemaError::EmptyRelations(name));
    }

    let mut parent_of = BTreeMap::<String, String>::new();
    let mut parents = BTreeSet::<String>::new();
    let mut id_fields = Vec::with_capacity(relations.len());

    for (parent, children) in relations {
        if !parents.insert(parent.clone()) {
            return Err(SchemaError::DuplicateParent(parent));
        }
        if children.is_empty() {
            return Err(SchemaError::NoChildren {
                join: name,
                parent,
            });
        }

        let mut child_set = BTreeSet::new();
        for child in children {
            if child == parent {
                return Err(SchemaError::SelfReference(child));
            }
            if let Some(first) = parent_of.get(&child) {
                if *first != parent {
                    return Err(SchemaError::MultipleParents {
                        child,
                        first: first.clone(),
                        second: parent,
                    });
                }
            }
            parent_of.insert(child.clone(), parent.clone());
            child_set.insert(child);
        }

        id_fields.push(ParentIdField::new(name.clone(), parent, child_set));
    }

    Ok(ParentJoinField::new(name, id_fields))
}

///
/// TESTS
///

use crate::{
    model::field::{FieldKind, FieldType},
    query::TermQuery,
};
use std::{collections::BTreeSet, sync::Arc};

/// Separator between the join field name and the parent name in the
/// generated parent-id field name (`join#question`).
pub const PARENT_ID_SEPARATOR: char = '#';

///
/// ParentJoinField
///
/// The single join declaration of an index: one field holding the relation
/// name of every document, plus one parent-id field per parent type.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParentJoinField {
    name: String,
    parent_id_fields: Vec<ParentIdField>,
}

impl ParentJoinField {
    pub(crate) const fn new(name: String, parent_id_fields: Vec<ParentIdField>) -> Self {
        Self {
            name,
            parent_id_fields,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn field_type(&self) -> FieldType {
        FieldType::new(self.name.clone(), FieldKind::Join)
    }

    pub fn parent_id_fields(&self) -> impl Iterator<Item = &ParentIdField> {
        self.parent_id_fields.iter()
    }

    /// Find the parent-id field for a relation name.
    ///
    /// With `is_parent`, `name` must be the parent of the field; otherwise it
    /// must be one of the field's children.
    #[must_use]
    pub fn parent_id_field(&self, name: &str, is_parent: bool) -> Option<&ParentIdField> {
        self.parent_id_fields.iter().find(|field| {
            if is_parent {
                field.parent_name() == name
            } else {
                field.has_child(name)
            }
        })
    }
}

///
/// ParentIdField
///
/// Keyword field storing, on each child document, the id of its parent.
/// Named `<join>#<parent>`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParentIdField {
    join_name: String,
    parent_name: String,
    children: BTreeSet<String>,
}

impl ParentIdField {
    pub(crate) const fn new(
        join_name: String,
        parent_name: String,
        children: BTreeSet<String>,
    ) -> Self {
        Self {
            join_name,
            parent_name,
            children,
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        format!(
            "{}{PARENT_ID_SEPARATOR}{}",
            self.join_name, self.parent_name
        )
    }

    #[must_use]
    pub fn parent_name(&self) -> &str {
        &self.parent_name
    }

    pub fn children(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(String::as_str)
    }

    #[must_use]
    pub fn has_child(&self, name: &str) -> bool {
        self.children.contains(name)
    }

    /// Selects every document of this field's parent type.
    #[must_use]
    pub fn parent_filter(&self) -> Arc<TermQuery> {
        Arc::new(TermQuery::new(&self.join_name, &self.parent_name))
    }

    /// Selects every document of exactly `child_type`.
    #[must_use]
    pub fn child_filter(&self, child_type: &str) -> Arc<TermQuery> {
        Arc::new(TermQuery::new(&self.join_name, child_type))
    }

    #[must_use]
    pub fn field_type(&self) -> FieldType {
        FieldType::new(self.name(), FieldKind::Keyword)
    }
}

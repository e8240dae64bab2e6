//! Typed field storage
//!
//! A [`TypedField`] is a named slot with a fixed declared type. A
//! [`FieldSet`] is the ordered collection of slots backing one entity; its
//! order is the table's column order as reported during introspection.

use crate::errors::{ModelError, Result};
use crate::schema::mapping::extractor;
use crate::store::{Cell, Row};
use crate::value::{TypeTag, Value};

/// Literal text that assignment normalises to an absent value
pub const NULL_LITERAL: &str = "NULL";

/// A named value slot constrained to one declared type
#[derive(Debug, Clone, PartialEq)]
pub struct TypedField {
    name: String,
    declared: TypeTag,
    value: Option<Value>,
}

impl TypedField {
    /// Create an empty slot
    pub fn new(name: impl Into<String>, declared: TypeTag) -> Self {
        Self {
            name: name.into(),
            declared,
            value: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> TypeTag {
        self.declared
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }

    /// Assign a value, enforcing the declared type
    ///
    /// The text literal `"NULL"` and a NULL cell are stored as an absent
    /// value. `Opaque` fields accept any value and keep it as the literal text
    /// written to the store.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the value's tag is not accepted by the declared type;
    /// the slot keeps its previous value.
    pub fn assign(&mut self, value: Option<Value>) -> Result<()> {
        match value {
            None | Some(Value::Opaque(Cell::Null)) => self.value = None,
            Some(Value::Text(ref s)) | Some(Value::Opaque(Cell::Text(ref s)))
                if s == NULL_LITERAL =>
            {
                self.value = None
            }
            Some(v) => {
                if !self.declared.accepts(v.tag()) {
                    return Err(ModelError::TypeMismatch {
                        field: self.name.clone(),
                        expected: self.declared.to_string(),
                        actual: v.tag().to_string(),
                    });
                }
                self.value = Some(match self.declared {
                    TypeTag::Opaque => Value::Opaque(Cell::Text(v.to_literal())),
                    _ => v,
                });
            }
        }
        Ok(())
    }

    /// Copy of this slot with the declared type kept and the value discarded
    pub fn blank(&self) -> Self {
        Self::new(self.name.clone(), self.declared)
    }

    /// Load this slot from a result row, degrading unreadable cells to absent
    fn load(&mut self, row: &Row) {
        self.value = extractor(self.declared)(row, &self.name);
    }
}

/// Ordered collection of typed fields, keyed by column name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    fields: Vec<TypedField>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slot, replacing any existing slot with the same name in place
    pub fn insert(&mut self, field: TypedField) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TypedField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypedField> {
        self.fields.iter()
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the set has no slots at all
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True if every slot's value is absent
    pub fn all_absent(&self) -> bool {
        self.fields.iter().all(TypedField::is_absent)
    }

    /// Same slots with every value discarded
    pub fn blank(&self) -> Self {
        Self {
            fields: self.fields.iter().map(TypedField::blank).collect(),
        }
    }

    pub fn clear_values(&mut self) {
        for field in &mut self.fields {
            field.value = None;
        }
    }

    /// Materialize every slot from a result row
    ///
    /// Columns missing from the row (partial projection) and cells that fail
    /// typed extraction leave the slot absent.
    pub fn fill(&mut self, row: &Row) {
        for field in &mut self.fields {
            field.load(row);
        }
    }

    /// Column/literal pairs for an INSERT or UPDATE, absent values as `None`
    pub fn to_mutations(&self) -> Vec<(String, Option<String>)> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.value.as_ref().map(Value::to_literal)))
            .collect()
    }
}

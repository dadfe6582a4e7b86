//! Form state for the entity editor
//!
//! Holds the values currently typed into the dialog together with the latest
//! validation result. Numeric fields are coerced from text as they change.

use serde_json::{Number, Value};

use crate::models::{Entity, Field};
use crate::schema::{FieldErrors, RawRecord, Schema, ValidatedDraft};

#[derive(Debug, Clone)]
pub struct FormState {
    schema: Schema,
    values: RawRecord,
    errors: FieldErrors,
    submitted: bool,
}

impl FormState {
    /// Empty form for a new item
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            values: RawRecord::new(),
            errors: FieldErrors::new(),
            submitted: false,
        }
    }

    /// Form seeded with an existing item's values
    pub fn seeded(schema: Schema, entity: &Entity) -> Self {
        Self {
            values: RawRecord::from_entity(entity),
            ..Self::empty(schema)
        }
    }

    /// Apply raw text typed into a field. Returns false for the identifier,
    /// which is not editable.
    pub fn update(&mut self, field: Field, input: &str) -> bool {
        let value = if field.is_numeric() {
            coerce_number(input)
        } else {
            Value::String(input.to_string())
        };
        self.update_value(field, value)
    }

    pub fn update_value(&mut self, field: Field, value: Value) -> bool {
        if field == Field::Id {
            return false;
        }
        self.values.set(field, value);

        // Once the user has tried to submit, keep the messages in step with the input
        if self.submitted {
            self.errors = match self.schema.validate(&self.values) {
                Ok(_) => FieldErrors::new(),
                Err(errors) => errors,
            };
        }
        true
    }

    /// Current values, as handed to the validator at submit time
    pub fn snapshot(&self) -> RawRecord {
        self.values.clone()
    }

    /// Run the schema over the current values and remember the outcome
    pub fn validate(&mut self) -> Result<ValidatedDraft, FieldErrors> {
        self.submitted = true;
        match self.schema.validate(&self.values) {
            Ok(draft) => {
                self.errors = FieldErrors::new();
                Ok(draft)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(field)
    }

    /// Text shown in the input box for a field
    pub fn display_value(&self, field: Field) -> String {
        match self.values.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

/// Numeric coercion for number inputs. Blank input reads as zero and
/// unparseable text is kept verbatim so validation rejects it.
fn coerce_number(input: &str) -> Value {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Value::from(0);
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::from(n);
    }
    match trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(n) => Value::Number(n),
        None => Value::String(input.to_string()),
    }
}

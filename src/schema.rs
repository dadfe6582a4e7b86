//! Declarative validation rules for entity drafts
//!
//! A [`Schema`] turns a [`RawRecord`] (whatever the form currently holds) into
//! either a typed [`ValidatedDraft`] or a [`FieldErrors`] map. Every rule runs,
//! so the map carries one message per failing field.

use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

use crate::models::{Entity, EntityFields, EntityId, Field};

pub const NAME_MESSAGE: &str = "Character name must be at least 1 character";
pub const IMAGE_URL_MESSAGE: &str = "Invalid URL";
pub const SEQUENCE_NUMBER_MESSAGE: &str = "Number in line must be at least 1";
pub const YEAR_RELEASED_MESSAGE: &str = "Add year released";
pub const SOURCE_MESSAGE: &str = "Source must be at least 1 character";
pub const ID_MESSAGE: &str = "Required";

/// Largest integer a JSON number carries exactly (2^53 - 1)
pub const MAX_SEQUENCE_NUMBER: u64 = (1 << 53) - 1;

/// Which endpoint a draft is headed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaMode {
    Create,
    Update,
}

/// Candidate record keyed by field, holding raw JSON values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord(BTreeMap<Field, Value>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: Field, value: impl Into<Value>) {
        self.0.insert(field, value.into());
    }

    pub fn get(&self, field: Field) -> Option<&Value> {
        self.0.get(&field)
    }

    pub fn remove(&mut self, field: Field) -> Option<Value> {
        self.0.remove(&field)
    }

    /// Record holding every field of an existing entity
    pub fn from_entity(entity: &Entity) -> Self {
        Self::from_fields(&entity.fields).with(Field::Id, entity.id.as_str())
    }

    pub fn from_fields(fields: &EntityFields) -> Self {
        Self::new()
            .with(Field::Name, fields.name.as_str())
            .with(Field::ImageUrl, fields.image_url.as_str())
            .with(Field::Source, fields.source.as_str())
            .with(Field::YearReleased, fields.year_released.as_str())
            .with(Field::SequenceNumber, fields.sequence_number)
    }
}

/// Human readable message per failing field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// Output of a successful validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedDraft {
    Create(EntityFields),
    Update(Entity),
}

impl ValidatedDraft {
    pub fn fields(&self) -> &EntityFields {
        match self {
            ValidatedDraft::Create(fields) => fields,
            ValidatedDraft::Update(entity) => &entity.fields,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    mode: SchemaMode,
}

impl Schema {
    pub fn for_mode(mode: SchemaMode) -> Self {
        Self { mode }
    }

    /// Check every rule against the record
    pub fn validate(&self, record: &RawRecord) -> Result<ValidatedDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = non_empty_string(record.get(Field::Name));
        let image_url = url_string(record.get(Field::ImageUrl));
        let sequence_number = positive_integer(record.get(Field::SequenceNumber));
        let year_released = non_empty_string(record.get(Field::YearReleased));
        let source = non_empty_string(record.get(Field::Source));

        if name.is_none() {
            errors.insert(Field::Name, NAME_MESSAGE);
        }
        if image_url.is_none() {
            errors.insert(Field::ImageUrl, IMAGE_URL_MESSAGE);
        }
        if sequence_number.is_none() {
            errors.insert(Field::SequenceNumber, SEQUENCE_NUMBER_MESSAGE);
        }
        if year_released.is_none() {
            errors.insert(Field::YearReleased, YEAR_RELEASED_MESSAGE);
        }
        if source.is_none() {
            errors.insert(Field::Source, SOURCE_MESSAGE);
        }

        let id = match self.mode {
            SchemaMode::Create => None,
            SchemaMode::Update => {
                let id = record.get(Field::Id).and_then(Value::as_str).map(EntityId::new);
                if id.is_none() {
                    errors.insert(Field::Id, ID_MESSAGE);
                }
                id
            }
        };

        match (name, image_url, sequence_number, year_released, source) {
            (Some(name), Some(image_url), Some(sequence_number), Some(year_released), Some(source))
                if errors.is_empty() =>
            {
                let fields = EntityFields {
                    name,
                    image_url,
                    sequence_number,
                    year_released,
                    source,
                };
                Ok(match id {
                    Some(id) => ValidatedDraft::Update(Entity::new(id, fields)),
                    None => ValidatedDraft::Create(fields),
                })
            }
            _ => Err(errors),
        }
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn url_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if Url::parse(s).is_ok() => Some(s.clone()),
        _ => None,
    }
}

fn positive_integer(value: Option<&Value>) -> Option<u64> {
    let number = match value {
        Some(Value::Number(n)) => n,
        _ => return None,
    };

    if let Some(n) = number.as_u64() {
        return Some(n).filter(|n| (1..=MAX_SEQUENCE_NUMBER).contains(n));
    }

    // 3.0 counts as an integer, 3.5 does not
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= 1.0 && f <= MAX_SEQUENCE_NUMBER as f64 => Some(f as u64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn batman() -> RawRecord {
        RawRecord::new()
            .with(Field::Name, "Batman")
            .with(Field::ImageUrl, "https://x.com/b.png")
            .with(Field::SequenceNumber, 5)
            .with(Field::YearReleased, "2020")
            .with(Field::Source, "DC")
    }

    #[test]
    fn test_valid_create_record() {
        let draft = Schema::for_mode(SchemaMode::Create).validate(&batman()).unwrap();
        assert_eq!(
            draft,
            ValidatedDraft::Create(EntityFields {
                name: "Batman".to_string(),
                image_url: "https://x.com/b.png".to_string(),
                sequence_number: 5,
                year_released: "2020".to_string(),
                source: "DC".to_string(),
            })
        );
    }

    #[test]
    fn test_valid_update_record_keeps_id() {
        let record = batman().with(Field::Id, "1");
        let draft = Schema::for_mode(SchemaMode::Update).validate(&record).unwrap();
        match draft {
            ValidatedDraft::Update(entity) => {
                assert_eq!(entity.id.as_str(), "1");
                assert_eq!(entity.fields.name, "Batman");
            }
            other => panic!("expected update draft, got {:?}", other),
        }
    }

    #[test]
    fn test_create_ignores_id() {
        let record = batman().with(Field::Id, "1");
        let draft = Schema::for_mode(SchemaMode::Create).validate(&record).unwrap();
        assert!(matches!(draft, ValidatedDraft::Create(_)));
    }

    #[test]
    fn test_missing_name() {
        let mut record = batman();
        record.remove(Field::Name);
        let errors = Schema::for_mode(SchemaMode::Create).validate(&record).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::Name), Some(NAME_MESSAGE));

        let record = batman().with(Field::Name, "");
        let errors = Schema::for_mode(SchemaMode::Create).validate(&record).unwrap_err();
        assert_eq!(errors.get(Field::Name), Some(NAME_MESSAGE));
    }

    #[test]
    fn test_image_url() {
        let schema = Schema::for_mode(SchemaMode::Create);

        let record = batman().with(Field::ImageUrl, "not-a-url");
        let errors = schema.validate(&record).unwrap_err();
        assert_eq!(errors.get(Field::ImageUrl), Some(IMAGE_URL_MESSAGE));

        let record = batman().with(Field::ImageUrl, "https://example.com/x.png");
        assert!(schema.validate(&record).is_ok());
    }

    #[test]
    fn test_sequence_number_bounds() {
        let schema = Schema::for_mode(SchemaMode::Create);

        for bad in [json!(0), json!(-1), json!(1.5), json!("abc"), Value::Null] {
            let record = batman().with(Field::SequenceNumber, bad.clone());
            let errors = schema.validate(&record).unwrap_err();
            assert_eq!(
                errors.get(Field::SequenceNumber),
                Some(SEQUENCE_NUMBER_MESSAGE),
                "value {:?} should fail",
                bad
            );
        }

        let record = batman().with(Field::SequenceNumber, 1);
        assert!(schema.validate(&record).is_ok());

        let record = batman().with(Field::SequenceNumber, 3.0);
        let draft = schema.validate(&record).unwrap();
        assert_eq!(draft.fields().sequence_number, 3);
    }

    #[test]
    fn test_sequence_number_accepts_large_safe_integers() {
        let schema = Schema::for_mode(SchemaMode::Create);

        let record = batman().with(Field::SequenceNumber, 4_294_967_296u64);
        assert_eq!(schema.validate(&record).unwrap().fields().sequence_number, 4_294_967_296);

        let record = batman().with(Field::SequenceNumber, MAX_SEQUENCE_NUMBER);
        assert_eq!(schema.validate(&record).unwrap().fields().sequence_number, MAX_SEQUENCE_NUMBER);

        let record = batman().with(Field::SequenceNumber, MAX_SEQUENCE_NUMBER + 1);
        let errors = schema.validate(&record).unwrap_err();
        assert_eq!(errors.get(Field::SequenceNumber), Some(SEQUENCE_NUMBER_MESSAGE));
    }

    #[test]
    fn test_collects_every_violation() {
        let errors = Schema::for_mode(SchemaMode::Update)
            .validate(&RawRecord::new())
            .unwrap_err();

        assert_eq!(errors.len(), 6);
        assert_eq!(errors.get(Field::YearReleased), Some(YEAR_RELEASED_MESSAGE));
        assert_eq!(errors.get(Field::Source), Some(SOURCE_MESSAGE));
        assert_eq!(errors.get(Field::Id), Some(ID_MESSAGE));
    }

    #[test]
    fn test_update_requires_string_id() {
        let record = batman().with(Field::Id, 7);
        let errors = Schema::for_mode(SchemaMode::Update).validate(&record).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(Field::Id));
    }
}

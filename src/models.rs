use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the remote service once an item is persisted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a collectible carries apart from its identifier.
///
/// This is also the body posted to the create endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFields {
    pub name: String,
    pub image_url: String,
    pub sequence_number: u64,
    pub year_released: String,
    pub source: String,
}

/// A persisted collectible record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(alias = "_id")]
    pub id: EntityId,
    #[serde(flatten)]
    pub fields: EntityFields,
}

impl Entity {
    pub fn new(id: EntityId, fields: EntityFields) -> Self {
        Self { id, fields }
    }
}

/// Form fields of the entity editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Id,
    Name,
    ImageUrl,
    Source,
    YearReleased,
    SequenceNumber,
}

impl Field {
    /// Fields the user edits, in display order
    pub const EDITABLE: [Field; 5] = [
        Field::Name,
        Field::ImageUrl,
        Field::Source,
        Field::YearReleased,
        Field::SequenceNumber,
    ];

    pub fn label(&self) -> &str {
        match self {
            Field::Id => "ID",
            Field::Name => "Character Name",
            Field::ImageUrl => "Image URL",
            Field::Source => "Source",
            Field::YearReleased => "Year Released",
            Field::SequenceNumber => "Number in Line",
        }
    }

    /// JSON key used on the wire
    pub fn key(&self) -> &str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::ImageUrl => "imageUrl",
            Field::Source => "source",
            Field::YearReleased => "yearReleased",
            Field::SequenceNumber => "sequenceNumber",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Field::SequenceNumber)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_wire_format() {
        let entity = Entity::new(
            EntityId::new("abc123"),
            EntityFields {
                name: "Batman".to_string(),
                image_url: "https://x.com/b.png".to_string(),
                sequence_number: 5,
                year_released: "2020".to_string(),
                source: "DC".to_string(),
            },
        );

        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["id"], "abc123");
        assert_eq!(json["imageUrl"], "https://x.com/b.png");
        assert_eq!(json["sequenceNumber"], 5);
        assert_eq!(json["yearReleased"], "2020");
    }

    #[test]
    fn test_entity_accepts_document_store_id() {
        let sample = r#"{
            "_id": "65f0c0ffee",
            "name": "Robin",
            "imageUrl": "https://x.com/r.png",
            "sequenceNumber": 2,
            "yearReleased": "2021",
            "source": "DC"
        }"#;

        let parsed: Entity = serde_json::from_str(sample).unwrap();
        assert_eq!(parsed.id.as_str(), "65f0c0ffee");
        assert_eq!(parsed.fields.name, "Robin");
    }

    #[test]
    fn test_entity_requires_id() {
        let sample = r#"{
            "name": "Robin",
            "imageUrl": "https://x.com/r.png",
            "sequenceNumber": 2,
            "yearReleased": "2021",
            "source": "DC"
        }"#;

        assert!(serde_json::from_str::<Entity>(sample).is_err());
    }
}

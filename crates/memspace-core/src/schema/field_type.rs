use serde::{Deserialize, Serialize};

/// Column type as reported by the engine.
///
/// The mapping never interprets types; they are carried so callers can
/// inspect a schema before deciding how to edit it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    ObjectId,
    Geometry,
    SmallInteger,
    Integer,
    Single,
    Double,
    Text,
    Date,
    Guid,
    Blob,
    Raster,

    /// A type name this crate has no variant for.
    Other(String),
}

impl FieldType {
    /// Parses an engine type name. Unknown names are kept verbatim.
    pub fn from_name(name: &str) -> FieldType {
        match name {
            "OID" | "ObjectID" => FieldType::ObjectId,
            "Geometry" | "Shape" => FieldType::Geometry,
            "SmallInteger" | "ShortInteger" => FieldType::SmallInteger,
            "Integer" | "LongInteger" => FieldType::Integer,
            "Single" | "Float" => FieldType::Single,
            "Double" => FieldType::Double,
            "String" | "Text" => FieldType::Text,
            "Date" => FieldType::Date,
            "GUID" | "GlobalID" => FieldType::Guid,
            "Blob" => FieldType::Blob,
            "Raster" => FieldType::Raster,
            other => FieldType::Other(other.to_string()),
        }
    }

    /// Object id and geometry columns are maintained by the engine.
    pub fn is_required(&self) -> bool {
        matches!(self, FieldType::ObjectId | FieldType::Geometry)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::ObjectId
                | FieldType::SmallInteger
                | FieldType::Integer
                | FieldType::Single
                | FieldType::Double
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_and_unknown_names() {
        assert_eq!(FieldType::from_name("ShortInteger"), FieldType::SmallInteger);
        assert_eq!(FieldType::from_name("String"), FieldType::Text);
        assert_eq!(
            FieldType::from_name("XML"),
            FieldType::Other("XML".to_string())
        );
    }
}

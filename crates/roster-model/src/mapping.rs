use serde::{Deserialize, Serialize};

use crate::field::FieldKind;

/// The field or fields a column was detected as.
///
/// Serialises as a bare raw key for one field and as an array otherwise,
/// which is the shape the downstream converter accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetectedAs {
    One(FieldKind),
    Many(Vec<FieldKind>),
}

impl DetectedAs {
    pub fn from_fields(mut fields: Vec<FieldKind>) -> Self {
        if fields.len() == 1 {
            DetectedAs::One(fields.remove(0))
        } else {
            DetectedAs::Many(fields)
        }
    }

    pub fn fields(&self) -> Vec<FieldKind> {
        match self {
            DetectedAs::One(field) => vec![*field],
            DetectedAs::Many(fields) => fields.clone(),
        }
    }

    /// Comma-separated raw keys, e.g. `npi, firstName`.
    pub fn raw(&self) -> String {
        self.fields()
            .iter()
            .map(FieldKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Comma-separated template labels, e.g. `NPI Number, First Name`.
    pub fn readable(&self) -> String {
        self.fields()
            .iter()
            .map(FieldKind::label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One exported column mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRecord {
    pub column_name: String,
    pub detected_as: DetectedAs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_field_serializes_as_key() {
        let record = MappingRecord {
            column_name: "NPI".to_string(),
            detected_as: DetectedAs::from_fields(vec![FieldKind::Npi]),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"columnName":"NPI","detectedAs":"npi"}"#);
    }

    #[test]
    fn many_fields_serialize_as_array() {
        let record: MappingRecord =
            serde_json::from_str(r#"{"columnName":"Full Name","detectedAs":["firstName","lastName"]}"#)
                .unwrap();
        assert_eq!(
            record.detected_as.fields(),
            vec![FieldKind::FirstName, FieldKind::LastName]
        );
        assert_eq!(record.detected_as.readable(), "First Name, Last Name");
        assert_eq!(record.detected_as.raw(), "firstName, lastName");
    }
}

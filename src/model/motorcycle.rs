use serde::{Deserialize, Serialize};

/// A motorcycle on file. `code` is assigned by [`crate::codegen::next_code`]
/// when the record is created and never changes afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Motorcycle {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "modelo")]
    pub model: String,
    #[serde(rename = "ano")]
    pub year: String,
    /// `AAA-DDDD`
    #[serde(rename = "placa")]
    pub plate: String,
    #[serde(rename = "cor")]
    pub color: String,
    #[serde(rename = "chassi")]
    pub chassis: String,
    #[serde(rename = "observacoes")]
    pub notes: String,
}

impl Motorcycle {
    pub fn with_plate(plate: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            plate: plate.into(),
            model: model.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trips_stored_field_names() {
        let m = Motorcycle {
            code: "3".into(),
            model: "CG150".into(),
            year: "2020".into(),
            plate: "ABC-1234".into(),
            color: "Preta".into(),
            chassis: "9C2KC1670".into(),
            notes: "revisada".into(),
        };
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["codigo"], json!("3"));
        assert_eq!(v["placa"], json!("ABC-1234"));
        assert_eq!(v["observacoes"], json!("revisada"));
    }
}

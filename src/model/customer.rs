use serde::{Deserialize, Serialize};

/// A shop customer. Duplicates are allowed; nothing here is unique.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Customer {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    /// `(DD) DDDDD-DDDD`
    #[serde(rename = "telefone")]
    pub phone: String,
    /// `DDD.DDD.DDD-DD`
    #[serde(rename = "cpf")]
    pub tax_id: String,
    /// `DD/MM/YYYY`
    #[serde(rename = "nascimento")]
    pub birth_date: String,
}

impl Customer {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

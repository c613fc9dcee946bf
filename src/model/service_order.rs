use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A customer named by value. The customer may not exist.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CustomerRef(pub String);

/// A motorcycle named by its plate. The motorcycle may not exist.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PlateRef(pub String);

macro_rules! weak_ref_impls {
    ($t:ty) => {
        impl $t {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<&str> for $t {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $t {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

weak_ref_impls!(CustomerRef);
weak_ref_impls!(PlateRef);

/// Progress of a service order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceStatus {
    Open,
    Pending,
    Completed,
}

impl ServiceStatus {
    pub const ALL: [ServiceStatus; 3] = [Self::Open, Self::Pending, Self::Completed];

    /// The label this status is stored and shown as.
    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "Aberto",
            Self::Pending => "Pendente",
            Self::Completed => "Concluído",
        }
    }

    /// Case-insensitive lookup by stored label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "aberto" => Some(Self::Open),
            "pendente" => Some(Self::Pending),
            "concluído" | "concluido" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ServiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(status) = Self::from_label(s) {
            return Ok(status);
        }
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "pending" => Ok(Self::Pending),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

// An unset status is stored as "".
mod status_field {
    use super::*;

    pub fn serialize<S: Serializer>(v: &Option<ServiceStatus>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(v.map(ServiceStatus::label).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ServiceStatus>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        if raw.trim().is_empty() {
            return Ok(None);
        }
        ServiceStatus::from_label(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown service status {:?}", raw)))
    }
}

// Amounts are text, but a bare JSON number is accepted too.
fn amount_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Null(()),
    }
    Ok(match Raw::deserialize(d)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
        Raw::Null(()) => String::new(),
    })
}

/// A service order. `customer_name` and `plate` are weak references: they are
/// matched against the other collections by value and never cascade.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ServiceOrder {
    #[serde(rename = "cliente")]
    pub customer_name: CustomerRef,
    #[serde(rename = "moto")]
    pub motorcycle_model: String,
    #[serde(rename = "placa")]
    pub plate: PlateRef,
    #[serde(rename = "kilometragem")]
    pub mileage: String,
    /// `DD/MM/YYYY`
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(with = "status_field")]
    pub status: Option<ServiceStatus>,
    /// Decimal text, e.g. `"150.00"`. Parsed leniently by [`crate::stats::parse_amount`].
    #[serde(rename = "valor", deserialize_with = "amount_text")]
    pub amount: String,
}

impl ServiceOrder {
    pub fn with_amount(amount: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            ..Self::default()
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == Some(ServiceStatus::Completed)
    }
}

//! Entities of the shop and the JSON shape they are persisted in.
//!
//! Field names on disk follow the keys the shop's data has always used
//! (`nome`, `placa`, `valor`, ...), so existing collections load unchanged.

pub mod customer;
pub mod motorcycle;
pub mod service_order;

pub use customer::Customer;
pub use motorcycle::Motorcycle;
pub use service_order::{CustomerRef, PlateRef, ServiceOrder, ServiceStatus};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Binds an entity type to the store key its collection lives under.
pub trait Collection: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Store key holding the JSON array.
    const KEY: &'static str;
    /// Human-readable collection name used in logs and errors.
    const LABEL: &'static str;
}

impl Collection for Customer {
    const KEY: &'static str = "clientes";
    const LABEL: &'static str = "customers";
}

impl Collection for Motorcycle {
    const KEY: &'static str = "motos";
    const LABEL: &'static str = "motorcycles";
}

impl Collection for ServiceOrder {
    const KEY: &'static str = "servicos";
    const LABEL: &'static str = "service orders";
}

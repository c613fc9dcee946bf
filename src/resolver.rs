//! Soft references from service orders to customers and motorcycles.
//!
//! A service order names its customer and motorcycle by value. Nothing checks that
//! the referent exists; these helpers only suggest candidates while typing and
//! fill in the motorcycle model when the plate matches exactly.

use crate::model::{Customer, CustomerRef, Motorcycle, PlateRef, ServiceOrder};

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Customers whose name contains `query`, ignoring case. An empty query matches
/// every customer.
pub fn suggest_customers(query: &str, customers: &[Customer]) -> Vec<Customer> {
    customers
        .iter()
        .filter(|c| contains_ci(&c.name, query))
        .cloned()
        .collect()
}

/// Motorcycles whose plate contains `query`, ignoring case. An empty query
/// matches every motorcycle.
pub fn suggest_motorcycles(query: &str, motorcycles: &[Motorcycle]) -> Vec<Motorcycle> {
    motorcycles
        .iter()
        .filter(|m| contains_ci(&m.plate, query))
        .cloned()
        .collect()
}

/// The first motorcycle whose plate equals `query`, ignoring case.
pub fn resolve_exact_plate_match<'a>(
    query: &str,
    motorcycles: &'a [Motorcycle],
) -> Option<&'a Motorcycle> {
    let query = query.to_lowercase();
    motorcycles.iter().find(|m| m.plate.to_lowercase() == query)
}

/// The first customer whose name equals the reference, ignoring case.
pub fn resolve_customer<'a>(r: &CustomerRef, customers: &'a [Customer]) -> Option<&'a Customer> {
    let name = r.as_str().to_lowercase();
    customers.iter().find(|c| c.name.to_lowercase() == name)
}

pub fn resolve_plate<'a>(r: &PlateRef, motorcycles: &'a [Motorcycle]) -> Option<&'a Motorcycle> {
    resolve_exact_plate_match(r.as_str(), motorcycles)
}

/// Where a referencing field is in its `typing -> suggesting -> selected` cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuggestionState {
    #[default]
    Typing,
    Suggesting,
    Selected,
}

/// The editing state of a service order form.
///
/// Holds the order being built, the customers and motorcycles it can refer to and
/// the current suggestion lists for the two referencing fields.
#[derive(Debug, Clone, Default)]
pub struct OrderForm {
    pub order: ServiceOrder,
    customers: Vec<Customer>,
    motorcycles: Vec<Motorcycle>,
    customer_suggestions: Vec<Customer>,
    plate_suggestions: Vec<Motorcycle>,
    customer_state: SuggestionState,
    plate_state: SuggestionState,
}

impl OrderForm {
    pub fn new(customers: Vec<Customer>, motorcycles: Vec<Motorcycle>) -> Self {
        Self {
            customers,
            motorcycles,
            ..Self::default()
        }
    }

    /// Starts from an existing order, e.g. when editing.
    pub fn editing(order: ServiceOrder, customers: Vec<Customer>, motorcycles: Vec<Motorcycle>) -> Self {
        Self {
            order,
            ..Self::new(customers, motorcycles)
        }
    }

    pub fn customer_suggestions(&self) -> &[Customer] {
        &self.customer_suggestions
    }

    pub fn plate_suggestions(&self) -> &[Motorcycle] {
        &self.plate_suggestions
    }

    pub fn customer_state(&self) -> SuggestionState {
        self.customer_state
    }

    pub fn plate_state(&self) -> SuggestionState {
        self.plate_state
    }

    fn state_for(has_suggestions: bool) -> SuggestionState {
        if has_suggestions {
            SuggestionState::Suggesting
        } else {
            SuggestionState::Typing
        }
    }

    /// The customer field changed.
    pub fn input_customer(&mut self, text: &str) {
        self.order.customer_name = text.into();
        self.customer_suggestions = suggest_customers(text, &self.customers);
        self.customer_state = Self::state_for(!self.customer_suggestions.is_empty());
    }

    /// A customer suggestion was picked. The name is copied verbatim.
    pub fn select_customer(&mut self, name: &str) {
        self.order.customer_name = name.into();
        self.customer_suggestions.clear();
        self.customer_state = SuggestionState::Selected;
    }

    /// The plate field changed. The model is filled in whenever the text matches
    /// a plate on file exactly, on every change and not only on selection. A
    /// model that no longer matches is left as typed.
    pub fn input_plate(&mut self, text: &str) {
        self.order.plate = text.into();
        self.plate_suggestions = suggest_motorcycles(text, &self.motorcycles);
        self.plate_state = Self::state_for(!self.plate_suggestions.is_empty());
        if let Some(m) = resolve_exact_plate_match(text, &self.motorcycles) {
            self.order.motorcycle_model = m.model.clone();
        }
    }

    /// A plate suggestion was picked. The plate is copied verbatim and the model
    /// comes from the motorcycle with exactly that plate.
    pub fn select_plate(&mut self, plate: &str) {
        self.order.plate = plate.into();
        if let Some(m) = self.motorcycles.iter().find(|m| m.plate == plate) {
            self.order.motorcycle_model = m.model.clone();
        }
        self.plate_suggestions.clear();
        self.plate_state = SuggestionState::Selected;
    }

    pub fn into_order(self) -> ServiceOrder {
        self.order
    }
}

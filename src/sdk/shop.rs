use std::sync::Arc;

use uuid::Uuid;

use crate::codegen::next_code;
use crate::model::{Customer, Motorcycle, ServiceOrder};
use crate::repository::{Draft, EntityRepository};
use crate::resolver::{self, OrderForm};
use crate::stats::{self, RevenuePolicy, Stats};
use crate::validation::{validate_customer, validate_motorcycle, validate_service_order};
use crate::{KeyValueStore, Result};

/// The shop's three collections behind one store.
///
/// The `save_*` methods are the form boundary: a record that fails its field
/// rules comes back as [`crate::Error::Validation`] and the repository is never
/// touched.
pub struct Shop {
    customers: EntityRepository<Customer>,
    motorcycles: EntityRepository<Motorcycle>,
    orders: EntityRepository<ServiceOrder>,
}

fn entities<T: Clone>(draft: &Draft<T>) -> Vec<T> {
    draft.records().iter().map(|r| r.data.clone()).collect()
}

impl Shop {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            customers: EntityRepository::new(store.clone()),
            motorcycles: EntityRepository::new(store.clone()),
            orders: EntityRepository::new(store),
        }
    }

    pub fn customers(&self) -> &EntityRepository<Customer> {
        &self.customers
    }

    pub fn motorcycles(&self) -> &EntityRepository<Motorcycle> {
        &self.motorcycles
    }

    pub fn orders(&self) -> &EntityRepository<ServiceOrder> {
        &self.orders
    }

    pub async fn save_customer(&self, customer: Customer, position: Option<usize>) -> Result<Uuid> {
        validate_customer(&customer)?;
        self.customers.save(customer, position).await
    }

    /// New motorcycles get the next sequential code; an edited one keeps the
    /// code it already has, whatever `motorcycle.code` says.
    pub async fn save_motorcycle(&self, mut motorcycle: Motorcycle, position: Option<usize>) -> Result<Uuid> {
        validate_motorcycle(&motorcycle)?;
        self.motorcycles
            .save_with(position, move |draft| {
                match position {
                    None => motorcycle.code = next_code(&entities(draft)),
                    Some(p) => {
                        if let Some(existing) = draft.records().get(p) {
                            motorcycle.code = existing.data.code.clone();
                        }
                    }
                }
                motorcycle
            })
            .await
    }

    pub async fn save_order(&self, order: ServiceOrder, position: Option<usize>) -> Result<Uuid> {
        validate_service_order(&order)?;
        self.orders.save(order, position).await
    }

    /// Removes the customer at `position`. Orders naming this customer keep the
    /// name as typed.
    pub async fn delete_customer(&self, position: usize) -> Result<Customer> {
        self.customers.delete_at(position).await
    }

    pub async fn delete_customer_by_id(&self, id: Uuid) -> Result<Customer> {
        self.customers.delete(id).await
    }

    /// Removes the motorcycle at `position`. Its code is not reused unless it was
    /// the highest one on file.
    pub async fn delete_motorcycle(&self, position: usize) -> Result<Motorcycle> {
        self.motorcycles.delete_at(position).await
    }

    pub async fn delete_motorcycle_by_id(&self, id: Uuid) -> Result<Motorcycle> {
        self.motorcycles.delete(id).await
    }

    pub async fn delete_order(&self, position: usize) -> Result<ServiceOrder> {
        self.orders.delete_at(position).await
    }

    pub async fn delete_order_by_id(&self, id: Uuid) -> Result<ServiceOrder> {
        self.orders.delete(id).await
    }

    /// A blank order form primed with the current customers and motorcycles.
    pub async fn order_form(&self) -> Result<OrderForm> {
        Ok(OrderForm::new(
            self.customers.list().await?,
            self.motorcycles.list().await?,
        ))
    }

    /// An order form for editing the order at `position`.
    pub async fn edit_order_form(&self, position: usize) -> Result<OrderForm> {
        let order = self.orders.get_at(position).await?;
        Ok(OrderForm::editing(
            order,
            self.customers.list().await?,
            self.motorcycles.list().await?,
        ))
    }

    pub async fn suggest_customers(&self, query: &str) -> Result<Vec<Customer>> {
        Ok(resolver::suggest_customers(query, &self.customers.list().await?))
    }

    pub async fn suggest_motorcycles(&self, query: &str) -> Result<Vec<Motorcycle>> {
        Ok(resolver::suggest_motorcycles(query, &self.motorcycles.list().await?))
    }

    /// Reads all three collections and computes fresh statistics. Call it every
    /// time the dashboard is shown; results are never cached.
    pub async fn dashboard(&self, policy: RevenuePolicy) -> Result<Stats> {
        let customers = self.customers.list().await?;
        let motorcycles = self.motorcycles.list().await?;
        let orders = self.orders.list().await?;
        Ok(stats::compute(&customers, &motorcycles, &orders, policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemStore;
    use crate::model::ServiceStatus;
    use crate::Error;

    fn shop() -> Shop {
        Shop::new(Arc::new(MemStore::in_memory()))
    }

    fn moto(plate: &str) -> Motorcycle {
        Motorcycle {
            code: String::new(),
            model: "CG150".into(),
            year: "2021".into(),
            plate: plate.into(),
            color: "Vermelha".into(),
            chassis: "9C2KC1670".into(),
            notes: "nenhuma".into(),
        }
    }

    fn order(customer: &str, amount: &str) -> ServiceOrder {
        ServiceOrder {
            customer_name: customer.into(),
            motorcycle_model: "CG150".into(),
            plate: "ABC-1234".into(),
            mileage: "1000".into(),
            date: "10/10/2024".into(),
            description: "Revisão".into(),
            status: Some(ServiceStatus::Completed),
            amount: amount.into(),
        }
    }

    #[tokio::test]
    async fn test_invalid_record_never_reaches_repository() {
        let shop = shop();
        let err = shop.save_customer(Customer::named("Ana"), None).await.unwrap_err();
        match err {
            Error::Validation(v) => assert!(v.message("email").is_some()),
            other => panic!("unexpected error: {other}"),
        }
        assert!(shop.customers().is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_motorcycle_codes_are_sequential() {
        let shop = shop();
        shop.save_motorcycle(moto("AAA-0001"), None).await.unwrap();
        shop.save_motorcycle(moto("AAA-0002"), None).await.unwrap();
        let codes: Vec<_> = shop
            .motorcycles()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.code)
            .collect();
        assert_eq!(codes, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_edit_keeps_existing_code() {
        let shop = shop();
        shop.save_motorcycle(moto("AAA-0001"), None).await.unwrap();
        shop.save_motorcycle(moto("AAA-0002"), None).await.unwrap();

        let mut edited = moto("AAA-0009");
        edited.code = "99".into();
        shop.save_motorcycle(edited, Some(0)).await.unwrap();

        let first = shop.motorcycles().get_at(0).await.unwrap();
        assert_eq!(first.code, "1");
        assert_eq!(first.plate, "AAA-0009");

        shop.save_motorcycle(moto("AAA-0003"), None).await.unwrap();
        assert_eq!(shop.motorcycles().get_at(2).await.unwrap().code, "3");
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_codes() {
        let shop = shop();
        let (a, b) = futures::join!(
            shop.save_motorcycle(moto("AAA-0001"), None),
            shop.save_motorcycle(moto("AAA-0002"), None)
        );
        a.unwrap();
        b.unwrap();
        let mut codes: Vec<_> = shop
            .motorcycles()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.code)
            .collect();
        codes.sort();
        assert_eq!(codes, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_dashboard_reflects_latest_writes() {
        let shop = shop();
        let before = shop.dashboard(RevenuePolicy::AllOrders).await.unwrap();
        assert_eq!(before.order_count, 0);

        shop.save_order(order("Ana", "100.00"), None).await.unwrap();
        shop.save_order(order("Bob", "50.00"), None).await.unwrap();

        let after = shop.dashboard(RevenuePolicy::AllOrders).await.unwrap();
        assert_eq!(after.order_count, 2);
        assert_eq!(after.total_revenue, rust_decimal::Decimal::from(150));
        assert_eq!(
            after.most_recent_order.unwrap().customer_name.as_str(),
            "Bob"
        );
    }

    #[tokio::test]
    async fn test_delete_customer_by_position_and_id() {
        let shop = shop();
        let valid = |name: &str| Customer {
            name: name.into(),
            email: "x@example.com".into(),
            phone: "(11) 98765-4321".into(),
            tax_id: "123.456.789-00".into(),
            birth_date: "01/02/1990".into(),
        };
        shop.save_customer(valid("Ana"), None).await.unwrap();
        let bob = shop.save_customer(valid("Bob"), None).await.unwrap();
        shop.save_customer(valid("Cid"), None).await.unwrap();

        assert_eq!(shop.delete_customer(0).await.unwrap().name, "Ana");
        assert_eq!(shop.delete_customer_by_id(bob).await.unwrap().name, "Bob");
        assert!(shop.delete_customer(1).await.unwrap_err().is_not_found());
        assert!(shop.delete_customer_by_id(bob).await.unwrap_err().is_not_found());

        let left = shop.customers().list().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].name, "Cid");
    }

    #[tokio::test]
    async fn test_delete_motorcycle_by_position_and_id() {
        let shop = shop();
        let first = shop.save_motorcycle(moto("AAA-0001"), None).await.unwrap();
        shop.save_motorcycle(moto("AAA-0002"), None).await.unwrap();

        assert_eq!(shop.delete_motorcycle(1).await.unwrap().plate, "AAA-0002");
        assert_eq!(shop.delete_motorcycle_by_id(first).await.unwrap().code, "1");
        assert!(shop.motorcycles().is_empty().await.unwrap());
        assert!(shop.delete_motorcycle(0).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_order_by_position_and_id() {
        let shop = shop();
        let ana = shop.save_order(order("Ana", "10"), None).await.unwrap();
        shop.save_order(order("Bob", "20"), None).await.unwrap();
        shop.save_order(order("Cid", "30"), None).await.unwrap();

        // position 2 before the delete is gone afterwards; the id still resolves
        let cid = shop.orders().id_at(2).await.unwrap();
        assert_eq!(shop.delete_order(1).await.unwrap().customer_name.as_str(), "Bob");
        assert!(shop.delete_order(2).await.unwrap_err().is_not_found());
        assert_eq!(shop.delete_order_by_id(cid).await.unwrap().customer_name.as_str(), "Cid");
        assert_eq!(shop.delete_order_by_id(ana).await.unwrap().amount, "10");
        assert_eq!(shop.dashboard(RevenuePolicy::AllOrders).await.unwrap().order_count, 0);
    }

    #[tokio::test]
    async fn test_order_may_reference_unknown_customer() {
        let shop = shop();
        shop.save_order(order("Nobody On File", "10"), None).await.unwrap();
        let form = shop.edit_order_form(0).await.unwrap();
        assert_eq!(form.order.customer_name.as_str(), "Nobody On File");
        assert!(resolver::resolve_customer(&form.order.customer_name, &[]).is_none());
    }

    #[tokio::test]
    async fn test_order_form_autofills_from_saved_motorcycles() {
        let shop = shop();
        shop.save_motorcycle(moto("ABC-1234"), None).await.unwrap();

        let mut form = shop.order_form().await.unwrap();
        form.input_plate("abc-1234");
        assert_eq!(form.order.motorcycle_model, "CG150");
    }
}

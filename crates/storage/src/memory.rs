use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    AttendanceRecord, Client, Course, Enquiry, NewEnquiry, NewOrder, Order, Payment, StoreError,
    StudioClass, StudioDataset, StudioRepository,
};

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<StudioDataset>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(dataset: StudioDataset) -> Self {
        Self {
            data: Arc::new(RwLock::new(dataset)),
        }
    }

    pub fn snapshot(&self) -> StudioDataset {
        self.data.read().clone()
    }
}

#[async_trait]
impl StudioRepository for MemoryStore {
    async fn list_clients(&self) -> Result<Vec<Client>> {
        Ok(self.data.read().clients.clone())
    }

    async fn find_clients_by_name(&self, name: &str) -> Result<Vec<Client>> {
        let wanted = name.trim().to_lowercase();
        Ok(self
            .data
            .read()
            .clients
            .iter()
            .filter(|client| client.name.to_lowercase() == wanted)
            .cloned()
            .collect())
    }

    async fn find_client_by_email(&self, email: &str) -> Result<Option<Client>> {
        let wanted = email.trim();
        Ok(self
            .data
            .read()
            .clients
            .iter()
            .find(|client| client.email.eq_ignore_ascii_case(wanted))
            .cloned())
    }

    async fn find_client_by_phone(&self, phone: &str) -> Result<Option<Client>> {
        let wanted = phone.trim();
        Ok(self
            .data
            .read()
            .clients
            .iter()
            .find(|client| client.phone == wanted)
            .cloned())
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        Ok(self.data.read().courses.clone())
    }

    async fn list_classes(&self) -> Result<Vec<StudioClass>> {
        Ok(self.data.read().classes.clone())
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        Ok(self.data.read().orders.clone())
    }

    async fn orders_for_client(&self, client_id: &str) -> Result<Vec<Order>> {
        Ok(self
            .data
            .read()
            .orders
            .iter()
            .filter(|order| order.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn find_order_for_service(&self, service_name: &str) -> Result<Option<Order>> {
        Ok(self
            .data
            .read()
            .orders
            .iter()
            .find(|order| order.service_name == service_name)
            .cloned())
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order> {
        let mut data = self.data.write();
        if !data.clients.iter().any(|client| client.id == order.client_id) {
            return Err(StoreError::UnknownClient(order.client_id).into());
        }

        let record = Order {
            id: format!("order_{}", Uuid::new_v4().simple()),
            client_id: order.client_id,
            service_name: order.service_name,
            amount: order.amount,
            status: "pending".to_string(),
            created_on: order.created_on,
        };
        data.orders.push(record.clone());
        Ok(record)
    }

    async fn list_payments(&self) -> Result<Vec<Payment>> {
        Ok(self.data.read().payments.clone())
    }

    async fn list_attendance(&self) -> Result<Vec<AttendanceRecord>> {
        Ok(self.data.read().attendance.clone())
    }

    async fn list_enquiries(&self) -> Result<Vec<Enquiry>> {
        Ok(self.data.read().enquiries.clone())
    }

    async fn insert_enquiry(&self, enquiry: NewEnquiry) -> Result<Enquiry> {
        let record = Enquiry {
            id: format!("enquiry_{}", Uuid::new_v4().simple()),
            name: enquiry.name,
            email: enquiry.email,
            phone: enquiry.phone,
            notes: enquiry.notes,
            created_on: Utc::now(),
        };
        self.data.write().enquiries.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::seed_dataset;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[tokio::test]
    async fn name_lookup_ignores_case() {
        let store = MemoryStore::with_dataset(seed_dataset(today()));
        let hits = store.find_clients_by_name("  priya sharma ").await.unwrap();
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|client| client.name == "Priya Sharma"));
    }

    #[tokio::test]
    async fn orders_require_known_client() {
        let store = MemoryStore::with_dataset(seed_dataset(today()));
        let err = store
            .insert_order(NewOrder {
                client_id: "client_999".to_string(),
                service_name: "Yoga Beginner".to_string(),
                amount: 1000.0,
                created_on: today(),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("client_999"));

        let order = store
            .insert_order(NewOrder {
                client_id: "client_001".to_string(),
                service_name: "Yoga Beginner".to_string(),
                amount: 1200.0,
                created_on: today(),
            })
            .await
            .unwrap();
        assert_eq!(order.status, "pending");
        assert_eq!(store.orders_for_client("client_001").await.unwrap().last(), Some(&order));
    }

    #[tokio::test]
    async fn enquiries_are_appended() {
        let store = MemoryStore::new();
        store
            .insert_enquiry(NewEnquiry {
                name: Some("Divya Menon".to_string()),
                email: Some("divya@example.com".to_string()),
                phone: None,
                notes: "Wants to join Pilates".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(store.list_enquiries().await.unwrap().len(), 1);
    }
}

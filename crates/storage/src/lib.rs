mod memory;
mod seed;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryStore;
pub use seed::seed_dataset;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birthdate: NaiveDate,
    pub status: String,
    pub joined_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub instructor: String,
    pub status: String,
    pub duration_weeks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioClass {
    pub id: String,
    pub course_id: String,
    pub date: NaiveDate,
    pub instructor: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub client_id: String,
    pub service_name: String,
    pub amount: f64,
    pub status: String,
    pub created_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub amount_paid: f64,
    pub payment_date: NaiveDate,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub class_id: String,
    pub client_id: String,
    pub attended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enquiry {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: String,
    pub created_on: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub client_id: String,
    pub service_name: String,
    pub amount: f64,
    pub created_on: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewEnquiry {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudioDataset {
    pub clients: Vec<Client>,
    pub courses: Vec<Course>,
    pub classes: Vec<StudioClass>,
    pub orders: Vec<Order>,
    pub payments: Vec<Payment>,
    pub attendance: Vec<AttendanceRecord>,
    pub enquiries: Vec<Enquiry>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("client `{0}` not found")]
    UnknownClient(String),
}

/// Read/write access to studio records used by the agent tools.
#[async_trait]
pub trait StudioRepository: Send + Sync {
    async fn list_clients(&self) -> Result<Vec<Client>>;
    /// Case-insensitive exact name match.
    async fn find_clients_by_name(&self, name: &str) -> Result<Vec<Client>>;
    async fn find_client_by_email(&self, email: &str) -> Result<Option<Client>>;
    async fn find_client_by_phone(&self, phone: &str) -> Result<Option<Client>>;

    async fn list_courses(&self) -> Result<Vec<Course>>;
    async fn list_classes(&self) -> Result<Vec<StudioClass>>;

    async fn list_orders(&self) -> Result<Vec<Order>>;
    async fn orders_for_client(&self, client_id: &str) -> Result<Vec<Order>>;
    async fn find_order_for_service(&self, service_name: &str) -> Result<Option<Order>>;
    async fn insert_order(&self, order: NewOrder) -> Result<Order>;

    async fn list_payments(&self) -> Result<Vec<Payment>>;
    async fn list_attendance(&self) -> Result<Vec<AttendanceRecord>>;

    async fn list_enquiries(&self) -> Result<Vec<Enquiry>>;
    async fn insert_enquiry(&self, enquiry: NewEnquiry) -> Result<Enquiry>;
}

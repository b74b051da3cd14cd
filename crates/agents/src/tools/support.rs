use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use studio_core::{Tool, ToolInput, ToolOutput};
use studio_storage::{Client, NewEnquiry, NewOrder, StudioRepository};
use tracing::{debug, warn};

use super::Clock;

const DEFAULT_ORDER_AMOUNT: f64 = 1000.0;

async fn client_named(store: &dyn StudioRepository, name: &str) -> Result<Option<Client>> {
    let mut matches = store.find_clients_by_name(name).await?;
    if matches.len() > 1 {
        warn!(name = %name, matches = matches.len(), "several clients share this name; using the first");
    }
    Ok((!matches.is_empty()).then(|| matches.swap_remove(0)))
}

/// Course id to course name.
async fn course_names(store: &dyn StudioRepository) -> Result<HashMap<String, String>> {
    Ok(store
        .list_courses()
        .await?
        .into_iter()
        .map(|course| (course.id, course.name))
        .collect())
}

fn course_label<'a>(names: &'a HashMap<String, String>, course_id: &'a str) -> &'a str {
    names.get(course_id).map_or(course_id, String::as_str)
}

pub struct CreateOrderTool {
    store: Arc<dyn StudioRepository>,
    clock: Clock,
}

impl CreateOrderTool {
    pub fn new(store: Arc<dyn StudioRepository>, clock: Clock) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl Tool for CreateOrderTool {
    fn name(&self) -> &'static str {
        "Create Order"
    }

    async fn invoke(&self, input: &ToolInput) -> Result<ToolOutput> {
        let (Some(name), Some(service)) = (input.get("PER"), input.get("MISC")) else {
            warn!(per = ?input.raw("PER"), misc = ?input.raw("MISC"), "order refused: missing entities");
            return Ok(ToolOutput::text("Missing client name or service name."));
        };

        let Some(client) = client_named(self.store.as_ref(), name).await? else {
            return Ok(ToolOutput::text(format!("No client found with name: {name}")));
        };

        let amount = self
            .store
            .find_order_for_service(service)
            .await?
            .map(|order| order.amount)
            .unwrap_or(DEFAULT_ORDER_AMOUNT);
        debug!(service = %service, amount, "order price resolved");

        let order = self
            .store
            .insert_order(NewOrder {
                client_id: client.id.clone(),
                service_name: service.to_string(),
                amount,
                created_on: self.clock.today(),
            })
            .await?;

        Ok(ToolOutput::text(format!(
            "Order created: {} for {} ({}), amount {:.2}, status {}",
            order.id, client.name, order.service_name, order.amount, order.status
        )))
    }
}

pub struct CreateEnquiryTool {
    store: Arc<dyn StudioRepository>,
}

impl CreateEnquiryTool {
    pub fn new(store: Arc<dyn StudioRepository>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CreateEnquiryTool {
    fn name(&self) -> &'static str {
        "Create Enquiry"
    }

    async fn invoke(&self, input: &ToolInput) -> Result<ToolOutput> {
        let email = input.get("EMAIL");
        let phone = input.get("PHONE");
        if email.is_none() && phone.is_none() {
            warn!("enquiry refused: no email or phone");
            return Ok(ToolOutput::text(
                "Missing contact information to create enquiry.",
            ));
        }

        let enquiry = self
            .store
            .insert_enquiry(NewEnquiry {
                name: input.get("PER").map(str::to_string),
                email: email.map(str::to_string),
                phone: phone.map(str::to_string),
                notes: input
                    .get("MISC")
                    .unwrap_or("No additional notes.")
                    .to_string(),
            })
            .await?;

        Ok(ToolOutput::text(format!(
            "Enquiry created: {} for {} ({})",
            enquiry.id,
            enquiry.name.as_deref().unwrap_or("an unnamed contact"),
            enquiry.notes
        )))
    }
}

pub struct GetClientInfoTool {
    store: Arc<dyn StudioRepository>,
}

impl GetClientInfoTool {
    pub fn new(store: Arc<dyn StudioRepository>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetClientInfoTool {
    fn name(&self) -> &'static str {
        "Get Client Info"
    }

    // Name, then email, then phone: each key that is present replaces the
    // previous lookup result.
    async fn invoke(&self, input: &ToolInput) -> Result<ToolOutput> {
        let mut client = None;
        if let Some(name) = input.get("PER") {
            client = client_named(self.store.as_ref(), name).await?;
        }
        if let Some(email) = input.get("EMAIL") {
            client = self.store.find_client_by_email(email).await?;
        }
        if let Some(phone) = input.get("PHONE") {
            client = self.store.find_client_by_phone(phone).await?;
        }

        let Some(client) = client else {
            return Ok(ToolOutput::text("Client not found."));
        };

        Ok(ToolOutput::Structured(json!({
            "id": client.id,
            "name": client.name,
            "email": client.email,
            "phone": client.phone,
            "status": client.status,
            "birthdate": client.birthdate,
            "joining_date": client.joined_on,
        })))
    }
}

pub struct GetClientServicesTool {
    store: Arc<dyn StudioRepository>,
}

impl GetClientServicesTool {
    pub fn new(store: Arc<dyn StudioRepository>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetClientServicesTool {
    fn name(&self) -> &'static str {
        "Get Client Services"
    }

    async fn invoke(&self, input: &ToolInput) -> Result<ToolOutput> {
        let Some(name) = input.get("PER") else {
            return Ok(ToolOutput::text("No client name provided."));
        };
        let Some(client) = client_named(self.store.as_ref(), name).await? else {
            return Ok(ToolOutput::text(format!("No client found with name {name}")));
        };

        let orders = self.store.orders_for_client(&client.id).await?;
        if orders.is_empty() {
            return Ok(ToolOutput::text(format!(
                "{name} has not enrolled in any services yet."
            )));
        }

        let lines = orders
            .iter()
            .map(|order| format!("- {} (Status: {})", order.service_name, order.status))
            .collect::<Vec<_>>();
        Ok(ToolOutput::text(format!(
            "Services for {}:\n{}",
            client.name,
            lines.join("\n")
        )))
    }
}

pub struct ListClassesTool {
    store: Arc<dyn StudioRepository>,
}

impl ListClassesTool {
    pub fn new(store: Arc<dyn StudioRepository>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListClassesTool {
    fn name(&self) -> &'static str {
        "List Classes"
    }

    async fn invoke(&self, _input: &ToolInput) -> Result<ToolOutput> {
        let mut upcoming = self
            .store
            .list_classes()
            .await?
            .into_iter()
            .filter(|class| class.status == "scheduled")
            .collect::<Vec<_>>();
        if upcoming.is_empty() {
            return Ok(ToolOutput::text("No upcoming classes found."));
        }
        upcoming.sort_by_key(|class| class.date);
        let names = course_names(self.store.as_ref()).await?;

        Ok(ToolOutput::Structured(json!({
            "upcoming_classes": upcoming
                .iter()
                .map(|class| json!({
                    "class_id": class.id,
                    "course_id": class.course_id,
                    "course": course_label(&names, &class.course_id),
                    "instructor": class.instructor,
                    "date": class.date,
                }))
                .collect::<Vec<_>>()
        })))
    }
}

pub struct FilterClassesByInstructorTool {
    store: Arc<dyn StudioRepository>,
}

impl FilterClassesByInstructorTool {
    pub fn new(store: Arc<dyn StudioRepository>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for FilterClassesByInstructorTool {
    fn name(&self) -> &'static str {
        "Filter Classes by Instructor"
    }

    async fn invoke(&self, input: &ToolInput) -> Result<ToolOutput> {
        let Some(instructor) = input.get("PER") else {
            return Ok(ToolOutput::text("No instructor name provided."));
        };

        let classes = self
            .store
            .list_classes()
            .await?
            .into_iter()
            .filter(|class| class.instructor.eq_ignore_ascii_case(instructor))
            .collect::<Vec<_>>();
        if classes.is_empty() {
            return Ok(ToolOutput::text(format!(
                "No classes found for instructor {instructor}."
            )));
        }

        let names = course_names(self.store.as_ref()).await?;
        let lines = classes
            .iter()
            .map(|class| {
                format!("- {} on {}", course_label(&names, &class.course_id), class.date)
            })
            .collect::<Vec<_>>();
        Ok(ToolOutput::text(format!(
            "Classes by {instructor}:\n{}",
            lines.join("\n")
        )))
    }
}

pub struct FilterClassesByStatusTool {
    store: Arc<dyn StudioRepository>,
}

impl FilterClassesByStatusTool {
    pub fn new(store: Arc<dyn StudioRepository>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for FilterClassesByStatusTool {
    fn name(&self) -> &'static str {
        "Filter Classes by Status"
    }

    async fn invoke(&self, input: &ToolInput) -> Result<ToolOutput> {
        let Some(status) = input.get("STATUS") else {
            return Ok(ToolOutput::text("No status provided."));
        };
        let wanted = status.to_lowercase();

        let classes = self
            .store
            .list_classes()
            .await?
            .into_iter()
            .filter(|class| class.status == wanted)
            .collect::<Vec<_>>();
        if classes.is_empty() {
            return Ok(ToolOutput::text(format!(
                "No classes found with status '{status}'."
            )));
        }

        let lines = classes
            .iter()
            .map(|class| format!("- {} on {}", class.instructor, class.date))
            .collect::<Vec<_>>();
        Ok(ToolOutput::text(format!(
            "Classes with status '{status}':\n{}",
            lines.join("\n")
        )))
    }
}

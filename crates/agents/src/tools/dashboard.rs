use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use studio_core::extract::{month_name, month_number};
use studio_core::{Tool, ToolInput, ToolOutput};
use studio_storage::{Order, StudioRepository};
use tracing::warn;

use super::Clock;

const BIRTHDAY_WINDOW_DAYS: i64 = 30;
const TOP_SERVICES: usize = 5;

pub struct RevenueMetricsTool {
    store: Arc<dyn StudioRepository>,
}

impl RevenueMetricsTool {
    pub fn new(store: Arc<dyn StudioRepository>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for RevenueMetricsTool {
    fn name(&self) -> &'static str {
        "Revenue Metrics"
    }

    async fn invoke(&self, input: &ToolInput) -> Result<ToolOutput> {
        let month = match input.get("MONTH") {
            Some(raw) => match month_number(raw) {
                Some(number) => Some(number),
                None => {
                    warn!(month = %raw, "revenue refused: unrecognized month");
                    return Ok(ToolOutput::text(format!("Invalid month: {raw}")));
                }
            },
            None => None,
        };
        let year = match input.get("YEAR") {
            Some(raw) => match raw.parse::<i32>() {
                Ok(year) => Some(year),
                Err(_) => {
                    warn!(year = %raw, "revenue refused: unparseable year");
                    return Ok(ToolOutput::text(format!("Invalid year: {raw}")));
                }
            },
            None => None,
        };

        let total = self
            .store
            .list_payments()
            .await?
            .iter()
            .filter(|payment| month.map_or(true, |m| payment.payment_date.month() == m))
            .filter(|payment| year.map_or(true, |y| payment.payment_date.year() == y))
            .map(|payment| payment.amount_paid)
            .sum::<f64>();

        let period = [
            month.and_then(month_name).map(str::to_string),
            year.map(|y| y.to_string()),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();
        let scope = if period.is_empty() {
            String::new()
        } else {
            format!(" for {}", period.join(" "))
        };

        Ok(ToolOutput::text(format!("Total revenue{scope}: ₹{total:.2}")))
    }
}

pub struct OutstandingPaymentsTool {
    store: Arc<dyn StudioRepository>,
}

impl OutstandingPaymentsTool {
    pub fn new(store: Arc<dyn StudioRepository>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for OutstandingPaymentsTool {
    fn name(&self) -> &'static str {
        "Return Outstanding Payments"
    }

    async fn invoke(&self, _input: &ToolInput) -> Result<ToolOutput> {
        let outstanding = self
            .store
            .list_orders()
            .await?
            .iter()
            .filter(|order| order.status == "pending")
            .map(|order| order.amount)
            .sum::<f64>();
        Ok(ToolOutput::text(format!(
            "Total outstanding payments amount: ₹{outstanding:.2}"
        )))
    }
}

pub struct ActiveInactiveClientsTool {
    store: Arc<dyn StudioRepository>,
}

impl ActiveInactiveClientsTool {
    pub fn new(store: Arc<dyn StudioRepository>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ActiveInactiveClientsTool {
    fn name(&self) -> &'static str {
        "Active vs Inactive Clients"
    }

    async fn invoke(&self, _input: &ToolInput) -> Result<ToolOutput> {
        let clients = self.store.list_clients().await?;
        let active = clients.iter().filter(|c| c.status == "active").count();
        let inactive = clients.iter().filter(|c| c.status == "inactive").count();
        Ok(ToolOutput::text(format!(
            "Active clients: {active}, Inactive clients: {inactive}"
        )))
    }
}

/// Next occurrence of a birthday on or after `today`. Feb 29 falls back to Mar 1.
fn next_birthday(birthdate: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let in_year = |year: i32| {
        NaiveDate::from_ymd_opt(year, birthdate.month(), birthdate.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
    };
    let this_year = in_year(today.year())?;
    if this_year >= today {
        Some(this_year)
    } else {
        in_year(today.year() + 1)
    }
}

pub struct BirthdayReminderTool {
    store: Arc<dyn StudioRepository>,
    clock: Clock,
}

impl BirthdayReminderTool {
    pub fn new(store: Arc<dyn StudioRepository>, clock: Clock) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl Tool for BirthdayReminderTool {
    fn name(&self) -> &'static str {
        "FetchUpcomingBirthdays"
    }

    async fn invoke(&self, _input: &ToolInput) -> Result<ToolOutput> {
        let today = self.clock.today();
        let mut upcoming = self
            .store
            .list_clients()
            .await?
            .into_iter()
            .filter_map(|client| {
                let next = next_birthday(client.birthdate, today)?;
                let days = (next - today).num_days();
                (0..=BIRTHDAY_WINDOW_DAYS)
                    .contains(&days)
                    .then_some((next, client))
            })
            .collect::<Vec<_>>();

        if upcoming.is_empty() {
            return Ok(ToolOutput::text("No client birthdays in the next 30 days."));
        }
        upcoming.sort_by_key(|(next, _)| *next);

        let lines = upcoming
            .iter()
            .map(|(_, client)| format!("{} (birthday {})", client.name, client.birthdate))
            .collect::<Vec<_>>();
        Ok(ToolOutput::text(format!(
            "Clients with birthdays in the next 30 days:\n{}",
            lines.join("\n")
        )))
    }
}

pub struct NewClientsThisMonthTool {
    store: Arc<dyn StudioRepository>,
    clock: Clock,
}

impl NewClientsThisMonthTool {
    pub fn new(store: Arc<dyn StudioRepository>, clock: Clock) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl Tool for NewClientsThisMonthTool {
    fn name(&self) -> &'static str {
        "New Clients This Month"
    }

    async fn invoke(&self, _input: &ToolInput) -> Result<ToolOutput> {
        let today = self.clock.today();
        let joined = self
            .store
            .list_clients()
            .await?
            .into_iter()
            .filter(|client| {
                client.joined_on.year() == today.year() && client.joined_on.month() == today.month()
            })
            .collect::<Vec<_>>();

        if joined.is_empty() {
            return Ok(ToolOutput::text("No clients joined this month."));
        }

        let lines = joined
            .iter()
            .map(|client| format!("{} (joined {})", client.name, client.joined_on))
            .collect::<Vec<_>>();
        Ok(ToolOutput::text(format!(
            "Clients who joined this month:\n{}",
            lines.join("\n")
        )))
    }
}

pub struct ServiceAnalyticsTool {
    store: Arc<dyn StudioRepository>,
}

impl ServiceAnalyticsTool {
    pub fn new(store: Arc<dyn StudioRepository>) -> Self {
        Self { store }
    }
}

fn top_services(paid: &[&Order]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for order in paid {
        *counts.entry(order.service_name.as_str()).or_default() += 1;
    }
    let mut ranked = counts.into_iter().collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(TOP_SERVICES)
        .map(|(service, count)| format!("{service}: {count} enrollments"))
        .collect()
}

fn monthly_trend(paid: &[&Order]) -> Vec<String> {
    let mut by_month: BTreeMap<String, usize> = BTreeMap::new();
    for order in paid {
        let key = format!("{}-{:02}", order.created_on.year(), order.created_on.month());
        *by_month.entry(key).or_default() += 1;
    }
    by_month
        .into_iter()
        .map(|(month, count)| format!("{month}: {count} enrollments"))
        .collect()
}

/// Share of each service's orders that are paid.
fn completion_rates(orders: &[Order]) -> Vec<String> {
    let mut totals: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for order in orders {
        let entry = totals.entry(order.service_name.as_str()).or_default();
        entry.0 += 1;
        if order.status == "paid" {
            entry.1 += 1;
        }
    }
    totals
        .into_iter()
        .map(|(service, (total, paid))| {
            format!("{service}: {:.1}%", paid as f64 * 100.0 / total as f64)
        })
        .collect()
}

fn service_summary(service: &str, orders: &[Order]) -> String {
    let matching = orders
        .iter()
        .filter(|order| order.service_name.eq_ignore_ascii_case(service))
        .collect::<Vec<_>>();
    if matching.is_empty() {
        return format!("{service}: no orders");
    }
    let paid = matching.iter().filter(|order| order.status == "paid").count();
    format!(
        "{}: {paid} enrollments out of {} orders ({:.1}% paid)",
        matching[0].service_name,
        matching.len(),
        paid as f64 * 100.0 / matching.len() as f64
    )
}

fn or_no_data(lines: Vec<String>) -> String {
    if lines.is_empty() {
        "No data available.".to_string()
    } else {
        lines.join("; ")
    }
}

#[async_trait]
impl Tool for ServiceAnalyticsTool {
    fn name(&self) -> &'static str {
        "Service Analytics"
    }

    async fn invoke(&self, input: &ToolInput) -> Result<ToolOutput> {
        let orders = self.store.list_orders().await?;
        if orders.is_empty() {
            return Ok(ToolOutput::text("No service analytics data available."));
        }

        let paid = orders
            .iter()
            .filter(|order| order.status == "paid")
            .collect::<Vec<_>>();

        let mut report = format!(
            "Enrollment Trends: {}\nTop Services: {}\nCourse Completion Rates: {}",
            or_no_data(monthly_trend(&paid)),
            or_no_data(top_services(&paid)),
            or_no_data(completion_rates(&orders)),
        );
        // The ranking always spans every service; a named one only adds a line.
        if let Some(service) = input.get("MISC") {
            report.push_str("\nSelected Service: ");
            report.push_str(&service_summary(service, &orders));
        }
        Ok(ToolOutput::text(report))
    }
}

pub struct AttendanceReportTool {
    store: Arc<dyn StudioRepository>,
}

impl AttendanceReportTool {
    pub fn new(store: Arc<dyn StudioRepository>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Default)]
struct AttendanceTally {
    attended: usize,
    total: usize,
}

impl AttendanceTally {
    fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.attended as f64 * 100.0 / self.total as f64
        }
    }
}

#[async_trait]
impl Tool for AttendanceReportTool {
    fn name(&self) -> &'static str {
        "Attendance Reports"
    }

    async fn invoke(&self, input: &ToolInput) -> Result<ToolOutput> {
        let wanted = input.get("CLASS_ID");
        let mut tallies: Vec<(String, AttendanceTally)> = Vec::new();

        for record in self.store.list_attendance().await? {
            if wanted.is_some_and(|id| id != record.class_id) {
                continue;
            }
            let idx = match tallies.iter().position(|(id, _)| *id == record.class_id) {
                Some(idx) => idx,
                None => {
                    tallies.push((record.class_id.clone(), AttendanceTally::default()));
                    tallies.len() - 1
                }
            };
            let tally = &mut tallies[idx].1;
            tally.total += 1;
            if record.attended {
                tally.attended += 1;
            }
        }

        if tallies.is_empty() {
            return Ok(ToolOutput::text("No attendance data available."));
        }

        if let (Some(_), [(class_id, tally)]) = (wanted, tallies.as_slice()) {
            let pct = tally.percent();
            return Ok(ToolOutput::text(format!(
                "Attendance Percentage for {class_id}: {pct:.2}%\nDrop-off Rate: {:.2}%\nTotal Sessions: {}",
                100.0 - pct,
                tally.total
            )));
        }

        let blocks = tallies
            .iter()
            .map(|(class_id, tally)| {
                let pct = tally.percent();
                format!(
                    "Class ID: {class_id}\nAttendance: {pct:.2}%\nDrop-off: {:.2}%\nTotal Sessions: {}",
                    100.0 - pct,
                    tally.total
                )
            })
            .collect::<Vec<_>>();
        Ok(ToolOutput::text(format!(
            "Attendance Report for All Classes:\n\n{}",
            blocks.join("\n\n")
        )))
    }
}

#[cfg(test)]
mod tests {
    use studio_storage::{seed_dataset, MemoryStore, Payment, StudioDataset};

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input(pairs: &[(&str, &str)]) -> ToolInput {
        let mut input = ToolInput::empty();
        for (key, value) in pairs {
            input.set(*key, *value);
        }
        input
    }

    fn payment(id: &str, amount: f64, on: NaiveDate) -> Payment {
        Payment {
            id: id.to_string(),
            order_id: format!("order_{id}"),
            amount_paid: amount,
            payment_date: on,
            method: "UPI".to_string(),
        }
    }

    fn payments_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_dataset(StudioDataset {
            payments: vec![
                payment("1", 1200.0, date(2024, 1, 5)),
                payment("2", 800.0, date(2024, 1, 20)),
                payment("3", 500.0, date(2023, 1, 9)),
                payment("4", 1000.0, date(2024, 3, 2)),
            ],
            ..StudioDataset::default()
        }))
    }

    #[tokio::test]
    async fn revenue_accepts_abbreviated_month() {
        let tool = RevenueMetricsTool::new(payments_store());
        let out = tool
            .invoke(&input(&[("MONTH", "Jan"), ("YEAR", "2024")]))
            .await
            .unwrap();
        assert_eq!(out.to_string(), "Total revenue for January 2024: ₹2000.00");
    }

    #[tokio::test]
    async fn revenue_filters_are_optional() {
        let tool = RevenueMetricsTool::new(payments_store());
        let all = tool
            .invoke(&input(&[("MONTH", "Unknown"), ("YEAR", "Unknown")]))
            .await
            .unwrap();
        assert_eq!(all.to_string(), "Total revenue: ₹3500.00");

        let january = tool.invoke(&input(&[("MONTH", "january")])).await.unwrap();
        assert_eq!(january.to_string(), "Total revenue for January: ₹2500.00");
    }

    #[tokio::test]
    async fn revenue_rejects_bad_month() {
        let tool = RevenueMetricsTool::new(payments_store());
        let out = tool.invoke(&input(&[("MONTH", "Smarch")])).await.unwrap();
        assert_eq!(out.to_string(), "Invalid month: Smarch");
    }

    #[test]
    fn next_birthday_wraps_into_next_year() {
        let today = date(2024, 12, 20);
        assert_eq!(next_birthday(date(1990, 1, 3), today), Some(date(2025, 1, 3)));
        assert_eq!(next_birthday(date(1992, 12, 20), today), Some(date(2024, 12, 20)));
        assert_eq!(next_birthday(date(1992, 2, 29), date(2023, 2, 10)), Some(date(2023, 3, 1)));
    }

    #[tokio::test]
    async fn seeded_store_has_upcoming_birthdays_and_new_joiners() {
        let store = Arc::new(MemoryStore::with_dataset(seed_dataset(today())));

        let birthdays = BirthdayReminderTool::new(store.clone(), Clock::fixed(today()))
            .invoke(&ToolInput::empty())
            .await
            .unwrap()
            .to_string();
        assert!(birthdays.starts_with("Clients with birthdays in the next 30 days:"));
        assert!(birthdays.contains("Priya Sharma"));

        let joiners = NewClientsThisMonthTool::new(store, Clock::fixed(today()))
            .invoke(&ToolInput::empty())
            .await
            .unwrap()
            .to_string();
        assert!(joiners.starts_with("Clients who joined this month:"));
    }

    #[tokio::test]
    async fn attendance_for_one_class() {
        let store = Arc::new(MemoryStore::with_dataset(seed_dataset(today())));
        let tool = AttendanceReportTool::new(store.clone());

        let single = tool
            .invoke(&input(&[("CLASS_ID", "class_22")]))
            .await
            .unwrap()
            .to_string();
        assert!(single.starts_with("Attendance Percentage for class_22:"));
        assert!(single.ends_with("Total Sessions: 2"));

        let all = tool.invoke(&ToolInput::empty()).await.unwrap().to_string();
        assert!(all.starts_with("Attendance Report for All Classes:"));

        let none = tool
            .invoke(&input(&[("CLASS_ID", "class_999")]))
            .await
            .unwrap();
        assert_eq!(none.to_string(), "No attendance data available.");
    }

    #[tokio::test]
    async fn analytics_limits_top_services() {
        let store = Arc::new(MemoryStore::with_dataset(seed_dataset(today())));
        let out = ServiceAnalyticsTool::new(store)
            .invoke(&ToolInput::empty())
            .await
            .unwrap()
            .to_string();
        let top_line = out.lines().nth(1).unwrap();
        assert!(top_line.starts_with("Top Services: "));
        assert!(top_line.matches("enrollments").count() <= TOP_SERVICES);
        assert!(out.contains("Course Completion Rates: "));
        assert!(!out.contains("Selected Service"));
    }

    #[tokio::test]
    async fn named_service_keeps_full_ranking() {
        let store = Arc::new(MemoryStore::with_dataset(seed_dataset(today())));
        let tool = ServiceAnalyticsTool::new(store);

        let overall = tool.invoke(&ToolInput::empty()).await.unwrap().to_string();
        let focused = tool
            .invoke(&input(&[("MISC", "zumba advanced")]))
            .await
            .unwrap()
            .to_string();

        let overall_lines = overall.lines().collect::<Vec<_>>();
        let focused_lines = focused.lines().collect::<Vec<_>>();
        assert_eq!(focused_lines.len(), 4);
        assert_eq!(&focused_lines[..3], &overall_lines[..]);
        assert_eq!(focused_lines[1].matches("enrollments").count(), TOP_SERVICES);
        assert_eq!(
            focused_lines[3],
            "Selected Service: Zumba Advanced: 5 enrollments out of 6 orders (83.3% paid)"
        );

        let missing = tool
            .invoke(&input(&[("MISC", "Aerial Silks")]))
            .await
            .unwrap()
            .to_string();
        assert!(missing.ends_with("Selected Service: Aerial Silks: no orders"));
    }
}

mod dashboard;
mod support;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use studio_core::{Intent, Profile, ProfileError, ProfileKind, Tool};
use studio_storage::StudioRepository;

pub use dashboard::{
    ActiveInactiveClientsTool, AttendanceReportTool, BirthdayReminderTool,
    NewClientsThisMonthTool, OutstandingPaymentsTool, RevenueMetricsTool, ServiceAnalyticsTool,
};
pub use support::{
    CreateEnquiryTool, CreateOrderTool, FilterClassesByInstructorTool,
    FilterClassesByStatusTool, GetClientInfoTool, GetClientServicesTool, ListClassesTool,
};

/// Calendar date used by date-relative tools. Tests pin it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock {
    pinned: Option<NaiveDate>,
}

impl Clock {
    pub fn system() -> Self {
        Self::default()
    }

    pub fn fixed(date: NaiveDate) -> Self {
        Self { pinned: Some(date) }
    }

    pub fn today(&self) -> NaiveDate {
        self.pinned.unwrap_or_else(|| Utc::now().date_naive())
    }
}

pub fn support_tools(
    store: Arc<dyn StudioRepository>,
    clock: Clock,
) -> HashMap<Intent, Arc<dyn Tool>> {
    HashMap::from([
        (
            Intent::CreateOrder,
            Arc::new(CreateOrderTool::new(store.clone(), clock)) as Arc<dyn Tool>,
        ),
        (Intent::CreateEnquiry, Arc::new(CreateEnquiryTool::new(store.clone()))),
        (Intent::GetClientInfo, Arc::new(GetClientInfoTool::new(store.clone()))),
        (Intent::GetClientServices, Arc::new(GetClientServicesTool::new(store.clone()))),
        (Intent::ListUpcomingClasses, Arc::new(ListClassesTool::new(store.clone()))),
        (
            Intent::FilterClassesByInstructor,
            Arc::new(FilterClassesByInstructorTool::new(store.clone())),
        ),
        (Intent::FilterClassesByStatus, Arc::new(FilterClassesByStatusTool::new(store))),
    ])
}

pub fn dashboard_tools(
    store: Arc<dyn StudioRepository>,
    clock: Clock,
) -> HashMap<Intent, Arc<dyn Tool>> {
    HashMap::from([
        (
            Intent::GetRevenueMetrics,
            Arc::new(RevenueMetricsTool::new(store.clone())) as Arc<dyn Tool>,
        ),
        (Intent::GetOutstandingPayment, Arc::new(OutstandingPaymentsTool::new(store.clone()))),
        (
            Intent::GetActiveInactiveClientInsights,
            Arc::new(ActiveInactiveClientsTool::new(store.clone())),
        ),
        (
            Intent::GetClientBirthdayReminder,
            Arc::new(BirthdayReminderTool::new(store.clone(), clock)),
        ),
        (
            Intent::GetNewClientsThisMonth,
            Arc::new(NewClientsThisMonthTool::new(store.clone(), clock)),
        ),
        (Intent::GetServiceAnalytics, Arc::new(ServiceAnalyticsTool::new(store.clone()))),
        (Intent::GetAttendanceReport, Arc::new(AttendanceReportTool::new(store))),
    ])
}

/// Binds the bundled tools for `kind` over one repository.
pub fn studio_profile(
    kind: ProfileKind,
    store: Arc<dyn StudioRepository>,
    clock: Clock,
) -> Result<Profile, ProfileError> {
    let tools = match kind {
        ProfileKind::Support => support_tools(store, clock),
        ProfileKind::Dashboard => dashboard_tools(store, clock),
    };
    Profile::bind(kind, tools)
}

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::contracts::Tool;
use crate::error::ProfileError;
use crate::extract::{DomainExtractor, EntityKind};
use crate::models::{Intent, ProfileKind};

const SUPPORT_LABELS: &[Intent] = &[
    Intent::CreateOrder,
    Intent::CreateEnquiry,
    Intent::ListUpcomingClasses,
    Intent::GetClientInfo,
    Intent::GetClientServices,
    Intent::FilterClassesByInstructor,
    Intent::FilterClassesByStatus,
];

const DASHBOARD_LABELS: &[Intent] = &[
    Intent::GetRevenueMetrics,
    Intent::GetOutstandingPayment,
    Intent::GetActiveInactiveClientInsights,
    Intent::GetClientBirthdayReminder,
    Intent::GetNewClientsThisMonth,
    Intent::GetServiceAnalytics,
    Intent::GetAttendanceReport,
];

const SUPPORT_EXTRACTORS: &[EntityKind] = &[
    EntityKind::Email,
    EntityKind::Phone,
    EntityKind::Misc,
    EntityKind::Status,
];

const DASHBOARD_EXTRACTORS: &[EntityKind] = &[
    EntityKind::Misc,
    EntityKind::Month,
    EntityKind::Year,
    EntityKind::ClassId,
];

/// Static instruction text for one intent, before a tool is bound to it.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorTemplate {
    pub intent: Intent,
    pub instruction: &'static str,
    pub expected_output: &'static str,
}

const SUPPORT_TEMPLATES: &[DescriptorTemplate] = &[
    DescriptorTemplate {
        intent: Intent::CreateOrder,
        instruction: "Create an order for {MISC} for client {PER} with email {EMAIL} and phone number {PHONE}",
        expected_output: "Confirmation of order creation",
    },
    DescriptorTemplate {
        intent: Intent::CreateEnquiry,
        instruction: "Create an enquiry for {MISC} for {PER} with email {EMAIL} and phone number {PHONE}",
        expected_output: "Confirmation of enquiry creation",
    },
    DescriptorTemplate {
        intent: Intent::GetClientInfo,
        instruction: "Fetch information for client {PER} with email {EMAIL} and phone number {PHONE}",
        expected_output: "Client info retrieved",
    },
    DescriptorTemplate {
        intent: Intent::GetClientServices,
        instruction: "Get services for client {PER}",
        expected_output: "List of client services",
    },
    DescriptorTemplate {
        intent: Intent::ListUpcomingClasses,
        instruction: "List all available upcoming classes",
        expected_output: "List of classes from the database",
    },
    DescriptorTemplate {
        intent: Intent::FilterClassesByInstructor,
        instruction: "Filter classes by instructor {PER}",
        expected_output: "Filtered class list",
    },
    DescriptorTemplate {
        intent: Intent::FilterClassesByStatus,
        instruction: "Filter classes with status {STATUS}",
        expected_output: "Filtered class list",
    },
];

const DASHBOARD_TEMPLATES: &[DescriptorTemplate] = &[
    DescriptorTemplate {
        intent: Intent::GetRevenueMetrics,
        instruction: "Get revenue for month {MONTH}, and year {YEAR} using the Revenue Metrics tool",
        expected_output: "Values returned from the function in simple language, not restructured, fail gracefully if values not returned",
    },
    DescriptorTemplate {
        intent: Intent::GetOutstandingPayment,
        instruction: "Get outstanding payment value using the Outstanding Payments tool",
        expected_output: "Value returned from the function in simple language, not restructured",
    },
    DescriptorTemplate {
        intent: Intent::GetActiveInactiveClientInsights,
        instruction: "Get active/inactive client counts using the Active vs Inactive Clients tool",
        expected_output: "Active count and inactive count in simple language, not restructured",
    },
    DescriptorTemplate {
        intent: Intent::GetClientBirthdayReminder,
        instruction: "Fetch clients with birthdays in the next 30 days. This tool does not require any input",
        expected_output: "Birth dates in simple language, not restructured",
    },
    DescriptorTemplate {
        intent: Intent::GetNewClientsThisMonth,
        instruction: "Get clients who joined this month. This tool does not require any input",
        expected_output: "Client names and join dates in simple language, not restructured",
    },
    DescriptorTemplate {
        intent: Intent::GetServiceAnalytics,
        instruction: "Get service analytics including enrollment trends, top services, and course completion rates for {MISC}",
        expected_output: "Analytics returned in a simple text format covering trends, top services, and completions",
    },
    DescriptorTemplate {
        intent: Intent::GetAttendanceReport,
        instruction: "Get attendance percentages and drop-off rates. class id is {CLASS_ID}",
        expected_output: "Attendance and drop-off in simple text format",
    },
];

impl ProfileKind {
    /// Closed label set handed to the intent classifier.
    pub fn labels(self) -> &'static [Intent] {
        match self {
            Self::Support => SUPPORT_LABELS,
            Self::Dashboard => DASHBOARD_LABELS,
        }
    }

    pub fn extractors(self) -> &'static [EntityKind] {
        match self {
            Self::Support => SUPPORT_EXTRACTORS,
            Self::Dashboard => DASHBOARD_EXTRACTORS,
        }
    }

    pub fn templates(self) -> &'static [DescriptorTemplate] {
        match self {
            Self::Support => SUPPORT_TEMPLATES,
            Self::Dashboard => DASHBOARD_TEMPLATES,
        }
    }

    pub fn agent_name(self) -> &'static str {
        match self {
            Self::Support => "Support Agent",
            Self::Dashboard => "Dashboard Agent",
        }
    }
}

#[derive(Clone)]
pub struct ToolDescriptor {
    pub tool: Arc<dyn Tool>,
    pub instruction: &'static str,
    pub expected_output: &'static str,
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("tool", &self.tool.name())
            .field("instruction", &self.instruction)
            .field("expected_output", &self.expected_output)
            .finish()
    }
}

/// Label set, active extractors and intent -> tool table for one agent persona.
#[derive(Debug, Clone)]
pub struct Profile {
    kind: ProfileKind,
    descriptors: HashMap<Intent, ToolDescriptor>,
}

impl Profile {
    /// Binds one tool per intent. Fails unless every label of the profile is
    /// covered and no tool is bound to a foreign label.
    pub fn bind(
        kind: ProfileKind,
        mut tools: HashMap<Intent, Arc<dyn Tool>>,
    ) -> Result<Self, ProfileError> {
        if let Some(intent) = tools
            .keys()
            .find(|intent| !kind.labels().contains(*intent))
        {
            return Err(ProfileError::Foreign {
                profile: kind,
                intent: *intent,
            });
        }

        let mut descriptors = HashMap::with_capacity(kind.templates().len());
        for template in kind.templates() {
            let tool = tools
                .remove(&template.intent)
                .ok_or(ProfileError::Unbound {
                    profile: kind,
                    intent: template.intent,
                })?;
            descriptors.insert(
                template.intent,
                ToolDescriptor {
                    tool,
                    instruction: template.instruction,
                    expected_output: template.expected_output,
                },
            );
        }

        Ok(Self { kind, descriptors })
    }

    /// Table without the totality check, for exercising routing failures.
    pub fn from_descriptors(
        kind: ProfileKind,
        descriptors: HashMap<Intent, ToolDescriptor>,
    ) -> Self {
        Self { kind, descriptors }
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn labels(&self) -> &'static [Intent] {
        self.kind.labels()
    }

    pub fn extractor(&self) -> DomainExtractor {
        DomainExtractor::new(self.kind.extractors())
    }

    pub fn descriptor(&self, intent: Intent) -> Option<&ToolDescriptor> {
        self.descriptors.get(&intent)
    }
}

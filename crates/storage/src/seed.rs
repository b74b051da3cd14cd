use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};

use crate::{
    AttendanceRecord, Client, Course, Enquiry, Order, Payment, StudioClass, StudioDataset,
};

const FIRST_NAMES: [&str; 10] = [
    "Priya", "Amit", "Ravi", "Sneha", "Karan", "Megha", "Rahul", "Nisha", "Vikram", "Tanvi",
];
const LAST_NAMES: [&str; 5] = ["Sharma", "Verma", "Kapoor", "Mehta", "Patel"];
const COURSE_NAMES: [&str; 6] = [
    "Yoga Beginner",
    "Pilates Intermediate",
    "Zumba Advanced",
    "HIIT Express",
    "Strength Training",
    "Meditation Basics",
];
const INSTRUCTORS: [&str; 6] = [
    "Anjali Mehta",
    "Rahul Kapoor",
    "Sonal Jain",
    "Aakash Bhatt",
    "Ishita Roy",
    "Vikram Singh",
];
const PAYMENT_METHODS: [&str; 4] = ["UPI", "Credit Card", "Cash", "NetBanking"];

fn ymd(year: i32, month: u32, day: u32, fallback: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(fallback)
}

/// Deterministic demo dataset: 25 clients, 6 courses, 30 classes, 40 orders,
/// payments for most paid orders, 60 attendance rows and 2 enquiries.
/// Some birthdays, join dates and class dates are placed relative to `today`.
pub fn seed_dataset(today: NaiveDate) -> StudioDataset {
    let clients = (0..25usize)
        .map(|i| {
            let first = FIRST_NAMES[i % FIRST_NAMES.len()];
            let last = LAST_NAMES[(i / 2) % LAST_NAMES.len()];

            let birth_year = 1990 + (i % 10) as i32;
            let birthdate = if i % 6 == 0 {
                let upcoming = today + Duration::days((i % 25) as i64);
                ymd(birth_year, upcoming.month(), upcoming.day().min(28), today)
            } else {
                ymd(birth_year, (i * 5 % 12) as u32 + 1, (i * 7 % 28) as u32 + 1, today)
            };

            let joined_on = if i % 8 == 3 {
                ymd(today.year(), today.month(), (i % 20) as u32 + 1, today)
            } else {
                ymd(2024, (i * 3 % 12) as u32 + 1, (i * 11 % 28) as u32 + 1, today)
            };

            Client {
                id: format!("client_{:03}", i + 1),
                name: format!("{first} {last}"),
                email: format!("{}{}@example.com", first.to_lowercase(), i),
                phone: format!("98765{:05}", 10_000 + (i * 7_919) % 90_000),
                birthdate,
                status: if i % 3 == 2 { "inactive" } else { "active" }.to_string(),
                joined_on,
            }
        })
        .collect::<Vec<_>>();

    let courses = (0..COURSE_NAMES.len())
        .map(|i| Course {
            id: format!("course_{}", i + 1),
            name: COURSE_NAMES[i].to_string(),
            instructor: INSTRUCTORS[i].to_string(),
            status: if i % 2 == 0 { "ongoing" } else { "scheduled" }.to_string(),
            duration_weeks: [4, 6, 8][i % 3],
        })
        .collect::<Vec<_>>();

    let classes = (0..30usize)
        .map(|i| {
            let course = &courses[(i * 5) % courses.len()];
            let (date, status) = match i % 10 {
                7 => (today - Duration::days((i % 9 + 1) as i64), "completed"),
                9 => (today + Duration::days((i % 5 + 1) as i64), "canceled"),
                _ => (today + Duration::days((i * 3 % 21 + 1) as i64), "scheduled"),
            };
            StudioClass {
                id: format!("class_{}", i + 1),
                course_id: course.id.clone(),
                date,
                instructor: course.instructor.clone(),
                status: status.to_string(),
            }
        })
        .collect::<Vec<_>>();

    let orders = (0..40usize)
        .map(|i| {
            let client = &clients[(i * 7) % clients.len()];
            let course = &courses[(i * 5) % courses.len()];
            Order {
                id: format!("order_{}", i + 1),
                client_id: client.id.clone(),
                service_name: course.name.clone(),
                amount: (1_000 + (i * 137) % 1_501) as f64,
                status: if i % 10 < 7 { "paid" } else { "pending" }.to_string(),
                created_on: ymd(2024, (i % 12) as u32 + 1, (i * 3 % 28) as u32 + 1, today),
            }
        })
        .collect::<Vec<_>>();

    let payments = orders
        .iter()
        .filter(|order| order.status == "paid")
        .enumerate()
        .filter(|(idx, _)| idx % 4 != 3)
        .enumerate()
        .map(|(i, (_, order))| Payment {
            id: format!("payment_{}", i + 1),
            order_id: order.id.clone(),
            amount_paid: order.amount,
            payment_date: ymd(2024, (i * 5 % 12) as u32 + 1, (i * 3 % 28) as u32 + 1, today),
            method: PAYMENT_METHODS[i % PAYMENT_METHODS.len()].to_string(),
        })
        .collect::<Vec<_>>();

    let attendance = (0..60usize)
        .map(|i| AttendanceRecord {
            id: format!("att_{}", i + 1),
            class_id: classes[(i * 7) % classes.len()].id.clone(),
            client_id: clients[(i * 11) % clients.len()].id.clone(),
            attended: (i * 13) % 3 != 0,
        })
        .collect::<Vec<_>>();

    let created_on = Utc
        .with_ymd_and_hms(today.year(), today.month(), today.day(), 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let enquiries = vec![
        Enquiry {
            id: "enquiry_1".to_string(),
            name: Some("Divya Menon".to_string()),
            email: Some("divya@example.com".to_string()),
            phone: Some("9876543210".to_string()),
            notes: "Wants to join Pilates".to_string(),
            created_on,
        },
        Enquiry {
            id: "enquiry_2".to_string(),
            name: Some("Aarav Patel".to_string()),
            email: Some("aarav@example.com".to_string()),
            phone: Some("9999911111".to_string()),
            notes: "Interested in nutrition plan".to_string(),
            created_on,
        },
    ];

    StudioDataset {
        clients,
        courses,
        classes,
        orders,
        payments,
        attendance,
        enquiries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_has_expected_shape() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let data = seed_dataset(today);

        assert_eq!(data.clients.len(), 25);
        assert_eq!(data.courses.len(), 6);
        assert_eq!(data.classes.len(), 30);
        assert_eq!(data.orders.len(), 40);
        assert_eq!(data.attendance.len(), 60);
        assert_eq!(data.clients[0].name, "Priya Sharma");

        let paid = data.orders.iter().filter(|o| o.status == "paid").count();
        assert!(data.payments.len() < paid);
        assert!(data
            .attendance
            .iter()
            .any(|row| row.class_id == "class_22"));
    }
}

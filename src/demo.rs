//! Demo portfolio: one landlord, three tenants, two buildings.

use chrono::NaiveDate;

use crate::auth::hash_password;
use crate::error::RentifyResult;
use crate::models::{
    MaintenanceRequest, MaintenanceStatus, Payment, PaymentStatus, Property, TenantAssignment, Unit, User,
    UserRole,
};
use crate::rent::BillingMonth;

pub const DEMO_PASSWORD: &str = "password123";

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn billing(year: i32, month: u32) -> BillingMonth {
    BillingMonth::containing(ymd(year, month, 1))
}

pub fn users(bcrypt_cost: u32) -> RentifyResult<Vec<User>> {
    let password_hash = hash_password(DEMO_PASSWORD, bcrypt_cost)?;
    let user = |id: &str, email: &str, role: UserRole, name: &str| User {
        id: id.to_string(),
        email: email.to_string(),
        password_hash: password_hash.clone(),
        role,
        name: name.to_string(),
    };
    Ok(vec![
        user("landlord-1", "landlord@test.com", UserRole::Landlord, "John Landlord"),
        user("tenant-1", "tenant1@test.com", UserRole::Tenant, "Sarah Tenant"),
        user("tenant-2", "tenant2@test.com", UserRole::Tenant, "Mike Johnson"),
        user("tenant-3", "tenant3@test.com", UserRole::Tenant, "Emma Davis"),
    ])
}

pub fn properties() -> Vec<Property> {
    vec![
        Property {
            id: "prop-1".to_string(),
            landlord_id: "landlord-1".to_string(),
            name: "Sunset Apartments".to_string(),
            address: "123 Main St, Springfield".to_string(),
            created_at: ymd(2024, 1, 15),
        },
        Property {
            id: "prop-2".to_string(),
            landlord_id: "landlord-1".to_string(),
            name: "Green Valley Complex".to_string(),
            address: "456 Oak Ave, Springfield".to_string(),
            created_at: ymd(2024, 2, 1),
        },
    ]
}

pub fn units() -> Vec<Unit> {
    let unit = |id: &str, property_id: &str, name: &str, rent: f64, grace: u32| Unit {
        id: id.to_string(),
        property_id: property_id.to_string(),
        name: name.to_string(),
        monthly_rent: rent,
        due_date: 1,
        grace_period_days: grace,
    };
    vec![
        unit("unit-1", "prop-1", "Unit 101", 1200.0, 5),
        unit("unit-2", "prop-1", "Unit 102", 1350.0, 5),
        unit("unit-3", "prop-1", "Unit 201", 1100.0, 5),
        unit("unit-4", "prop-2", "Unit A", 1500.0, 3),
    ]
}

pub fn assignments() -> Vec<TenantAssignment> {
    [
        ("assign-1", "unit-1", "tenant-1", ymd(2024, 1, 1)),
        ("assign-2", "unit-2", "tenant-2", ymd(2024, 2, 1)),
        ("assign-3", "unit-3", "tenant-3", ymd(2024, 3, 1)),
    ]
    .into_iter()
    .map(|(id, unit_id, tenant_id, move_in_date)| TenantAssignment {
        id: id.to_string(),
        unit_id: unit_id.to_string(),
        tenant_id: tenant_id.to_string(),
        move_in_date,
        is_active: true,
    })
    .collect()
}

pub fn payments() -> Vec<Payment> {
    vec![
        Payment {
            id: "pay-1".to_string(),
            unit_id: "unit-1".to_string(),
            tenant_id: "tenant-1".to_string(),
            amount: 1200.0,
            date: ymd(2025, 12, 28),
            month: billing(2026, 1),
            status: PaymentStatus::Completed,
        },
        Payment {
            id: "pay-2".to_string(),
            unit_id: "unit-2".to_string(),
            tenant_id: "tenant-2".to_string(),
            amount: 1350.0,
            date: ymd(2025, 11, 30),
            month: billing(2025, 12),
            status: PaymentStatus::Completed,
        },
    ]
}

pub fn maintenance_requests() -> Vec<MaintenanceRequest> {
    vec![
        MaintenanceRequest {
            id: "maint-1".to_string(),
            unit_id: "unit-1".to_string(),
            tenant_id: "tenant-1".to_string(),
            description: "Kitchen faucet is leaking".to_string(),
            status: MaintenanceStatus::Pending,
            created_at: ymd(2026, 1, 10),
            resolved_at: None,
        },
        MaintenanceRequest {
            id: "maint-2".to_string(),
            unit_id: "unit-3".to_string(),
            tenant_id: "tenant-3".to_string(),
            description: "Heater not working properly".to_string(),
            status: MaintenanceStatus::Resolved,
            created_at: ymd(2025, 12, 20),
            resolved_at: Some(ymd(2025, 12, 22)),
        },
    ]
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rent::BillingMonth;

/// Build a record id such as `prop-6f1c…`.
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Landlord,
    Tenant,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Landlord => f.write_str("landlord"),
            UserRole::Tenant => f.write_str("tenant"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub name: String,
}

/// User as handed out over the API (no password hash).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub role: UserRole,
    pub name: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            name: user.name.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub landlord_id: String,
    pub name: String,
    pub address: String,
    pub created_at: NaiveDate,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    pub property_id: String,
    pub name: String,
    pub monthly_rent: f64,
    /// Day of month the rent falls due (1-31).
    pub due_date: u32,
    pub grace_period_days: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TenantAssignment {
    pub id: String,
    pub unit_id: String,
    pub tenant_id: String,
    pub move_in_date: NaiveDate,
    pub is_active: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
    Pending,
    Failed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub unit_id: String,
    pub tenant_id: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub month: BillingMonth,
    pub status: PaymentStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceStatus {
    Pending,
    Resolved,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    pub id: String,
    pub unit_id: String,
    pub tenant_id: String,
    pub description: String,
    pub status: MaintenanceStatus,
    pub created_at: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<NaiveDate>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VacateNotice {
    pub id: String,
    pub unit_id: String,
    pub tenant_id: String,
    pub vacate_date: NaiveDate,
    pub submitted_at: NaiveDate,
}

// --- Inputs: the caller-supplied part of each record ---

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub name: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub landlord_id: String,
    pub name: String,
    pub address: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewUnit {
    pub property_id: String,
    pub name: String,
    pub monthly_rent: f64,
    pub due_date: u32,
    pub grace_period_days: u32,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UnitUpdate {
    pub name: Option<String>,
    pub monthly_rent: Option<f64>,
    pub due_date: Option<u32>,
    pub grace_period_days: Option<u32>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub unit_id: String,
    pub tenant_id: String,
    pub move_in_date: NaiveDate,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub unit_id: String,
    pub tenant_id: String,
    pub amount: f64,
    pub month: BillingMonth,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewMaintenanceRequest {
    pub unit_id: String,
    pub tenant_id: String,
    pub description: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewVacateNotice {
    pub unit_id: String,
    pub tenant_id: String,
    pub vacate_date: NaiveDate,
}

/// JWT claims for REST sessions.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthPayload {
    pub sub: String, // user id
    pub role: UserRole,
    pub exp: usize,
}

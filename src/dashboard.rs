//! Read-side views derived from the entity store: what a landlord or a
//! tenant sees when they open their dashboard.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::RentifyResult;
use crate::models::{
    MaintenanceRequest, MaintenanceStatus, Payment, Property, TenantAssignment, Unit, VacateNotice,
};
use crate::rent::{BillingMonth, RentStatus};
use crate::store::EntityStore;

const RECENT_PAYMENTS: usize = 5;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyStats {
    pub property_id: String,
    pub total_units: usize,
    pub occupied_units: usize,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UnitRentLine {
    pub unit_id: String,
    pub unit_name: String,
    pub property_name: String,
    pub tenant_name: String,
    pub monthly_rent: f64,
    pub due_date: u32,
    pub status: RentStatus,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RentOverview {
    pub month: BillingMonth,
    pub total_expected: f64,
    pub collected: f64,
    pub paid_units: usize,
    pub overdue_units: usize,
    pub pending_units: usize,
    pub units: Vec<UnitRentLine>,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct MaintenanceBoard {
    pub pending: Vec<MaintenanceRequest>,
    pub resolved: Vec<MaintenanceRequest>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VacateNoticeLine {
    pub notice: VacateNotice,
    pub unit_name: String,
    pub tenant_name: String,
    /// Negative once the date has passed.
    pub days_until_vacate: i64,
    pub vacated: bool,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TenantOverview {
    pub assignment: TenantAssignment,
    pub unit: Unit,
    pub property: Property,
    pub month: BillingMonth,
    pub rent_status: RentStatus,
    pub recent_payments: Vec<Payment>,
    pub vacate_notice: Option<VacateNotice>,
    pub days_until_vacate: Option<i64>,
    pub maintenance_requests: Vec<MaintenanceRequest>,
}

impl MaintenanceBoard {
    fn from_requests<'a>(requests: impl Iterator<Item = &'a MaintenanceRequest>) -> Self {
        let mut board = Self::default();
        for request in requests {
            match request.status {
                MaintenanceStatus::Pending => board.pending.push(request.clone()),
                MaintenanceStatus::Resolved => board.resolved.push(request.clone()),
            }
        }
        board
    }
}

fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

impl EntityStore {
    pub fn property_stats(&self, property_id: &str) -> RentifyResult<PropertyStats> {
        self.find_property(property_id)?;
        let units: Vec<&Unit> = self.units().iter().filter(|u| u.property_id == property_id).collect();
        let occupied_units = units
            .iter()
            .filter(|u| self.active_assignment_for_unit(&u.id).is_some())
            .count();
        Ok(PropertyStats {
            property_id: property_id.to_string(),
            total_units: units.len(),
            occupied_units,
        })
    }

    /// Rent roll for a landlord's occupied units.
    pub fn rent_overview(&self, landlord_id: &str, month: BillingMonth) -> RentOverview {
        let mut overview = RentOverview {
            month,
            total_expected: 0.0,
            collected: 0.0,
            paid_units: 0,
            overdue_units: 0,
            pending_units: 0,
            units: Vec::new(),
        };

        for unit in self.units_of(landlord_id) {
            let Some(assignment) = self.active_assignment_for_unit(&unit.id) else {
                continue;
            };
            let status = self.rent_status(&unit.id, month);

            overview.total_expected += unit.monthly_rent;
            match status {
                RentStatus::Paid => {
                    overview.paid_units += 1;
                    overview.collected += unit.monthly_rent;
                }
                RentStatus::Pending => overview.pending_units += 1,
                RentStatus::OverdueGrace | RentStatus::OverdueLate => overview.overdue_units += 1,
            }

            overview.units.push(UnitRentLine {
                unit_id: unit.id.clone(),
                unit_name: unit.name.clone(),
                property_name: self.property_name(&unit.property_id),
                tenant_name: self.user_name(&assignment.tenant_id, "Unknown Tenant"),
                monthly_rent: unit.monthly_rent,
                due_date: unit.due_date,
                status,
            });
        }
        overview
    }

    /// Requests on the landlord's units, split by status.
    pub fn maintenance_board(&self, landlord_id: &str) -> MaintenanceBoard {
        MaintenanceBoard::from_requests(self.maintenance_requests().iter().filter(|request| {
            self.find_unit(&request.unit_id)
                .map(|unit| self.unit_owned_by(unit, landlord_id))
                .unwrap_or(false)
        }))
    }

    /// Requests a tenant filed, split by status.
    pub fn tenant_maintenance_board(&self, tenant_id: &str) -> MaintenanceBoard {
        MaintenanceBoard::from_requests(
            self.maintenance_requests()
                .iter()
                .filter(|request| request.tenant_id == tenant_id),
        )
    }

    pub fn vacate_notices_for_landlord(&self, landlord_id: &str) -> Vec<VacateNoticeLine> {
        let today = self.today();
        self.vacate_notices()
            .iter()
            .filter_map(|notice| {
                let unit = self.find_unit(&notice.unit_id).ok()?;
                if !self.unit_owned_by(unit, landlord_id) {
                    return None;
                }
                let days = days_between(today, notice.vacate_date);
                Some(VacateNoticeLine {
                    notice: notice.clone(),
                    unit_name: unit.name.clone(),
                    tenant_name: self.user_name(&notice.tenant_id, "Unknown"),
                    days_until_vacate: days,
                    vacated: days < 0,
                })
            })
            .collect()
    }

    /// Everything a tenant's dashboard shows; `None` without an active unit.
    pub fn tenant_overview(&self, tenant_id: &str, month: BillingMonth) -> Option<TenantOverview> {
        let assignment = self.active_assignment_for_tenant(tenant_id)?;
        let unit = self.find_unit(&assignment.unit_id).ok()?;
        let property = self.find_property(&unit.property_id).ok()?;

        let payments: Vec<&Payment> = self.payments().iter().filter(|p| p.tenant_id == tenant_id).collect();
        let recent_payments = payments[payments.len().saturating_sub(RECENT_PAYMENTS)..]
            .iter()
            .map(|p| (*p).clone())
            .collect();

        let vacate_notice = self
            .vacate_notices()
            .iter()
            .find(|n| n.tenant_id == tenant_id && n.unit_id == unit.id)
            .cloned();
        let days_until_vacate = vacate_notice
            .as_ref()
            .map(|n| days_between(self.today(), n.vacate_date));

        Some(TenantOverview {
            assignment: assignment.clone(),
            unit: unit.clone(),
            property: property.clone(),
            month,
            rent_status: self.rent_status(&unit.id, month),
            recent_payments,
            vacate_notice,
            days_until_vacate,
            maintenance_requests: self
                .maintenance_requests()
                .iter()
                .filter(|r| r.tenant_id == tenant_id)
                .cloned()
                .collect(),
        })
    }

    fn property_name(&self, property_id: &str) -> String {
        self.find_property(property_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|_| "Unknown".to_string())
    }

    fn user_name(&self, user_id: &str, fallback: &str) -> String {
        self.find_user(user_id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|_| fallback.to_string())
    }
}

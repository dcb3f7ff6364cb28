//! Entity store: the in-memory record collections and every mutation on them.
//!
//! Each mutation updates the affected collection in memory and immediately
//! rewrites that collection's key in [`Storage`]. Nothing is batched.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::{hash_password, verify_password};
use crate::demo;
use crate::error::{RentifyError, RentifyResult};
use crate::models::{
    new_id, MaintenanceRequest, MaintenanceStatus, NewAssignment, NewMaintenanceRequest, NewPayment,
    NewProperty, NewUnit, NewUser, NewVacateNotice, Payment, PaymentStatus, Property, TenantAssignment,
    Unit, UnitUpdate, User, UserRole, VacateNotice,
};
use crate::rent::{self, BillingMonth, Clock, RentStatus};
use crate::storage::{
    Storage, ASSIGNMENTS_KEY, MAINTENANCE_KEY, PAYMENTS_KEY, PROPERTIES_KEY, UNITS_KEY, USERS_KEY,
    VACATE_NOTICES_KEY,
};

pub struct EntityStore {
    storage: Storage,
    clock: Arc<dyn Clock>,
    current_user: Option<User>,
    users: Vec<User>,
    properties: Vec<Property>,
    units: Vec<Unit>,
    assignments: Vec<TenantAssignment>,
    payments: Vec<Payment>,
    maintenance_requests: Vec<MaintenanceRequest>,
    vacate_notices: Vec<VacateNotice>,
}

impl EntityStore {
    /// Load every collection from `storage`. Missing keys start empty.
    pub fn open(storage: Storage, clock: Arc<dyn Clock>) -> RentifyResult<Self> {
        let store = Self {
            current_user: storage.load_current_user()?,
            users: storage.load_collection(USERS_KEY)?.unwrap_or_default(),
            properties: storage.load_collection(PROPERTIES_KEY)?.unwrap_or_default(),
            units: storage.load_collection(UNITS_KEY)?.unwrap_or_default(),
            assignments: storage.load_collection(ASSIGNMENTS_KEY)?.unwrap_or_default(),
            payments: storage.load_collection(PAYMENTS_KEY)?.unwrap_or_default(),
            maintenance_requests: storage.load_collection(MAINTENANCE_KEY)?.unwrap_or_default(),
            vacate_notices: storage.load_collection(VACATE_NOTICES_KEY)?.unwrap_or_default(),
            storage,
            clock,
        };
        info!(
            users = store.users.len(),
            properties = store.properties.len(),
            units = store.units.len(),
            payments = store.payments.len(),
            "Entity store loaded"
        );
        Ok(store)
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn current_month(&self) -> BillingMonth {
        BillingMonth::containing(self.today())
    }

    pub fn flush(&self) -> RentifyResult<()> {
        self.storage.flush()?;
        Ok(())
    }

    /// Load the demo portfolio when the store holds no users yet.
    ///
    /// Returns whether anything was written.
    pub fn seed_demo_data(&mut self, bcrypt_cost: u32) -> RentifyResult<bool> {
        if !self.users.is_empty() {
            debug!("Store already populated, skipping demo seed");
            return Ok(false);
        }
        self.users = demo::users(bcrypt_cost)?;
        self.properties = demo::properties();
        self.units = demo::units();
        self.assignments = demo::assignments();
        self.payments = demo::payments();
        self.maintenance_requests = demo::maintenance_requests();
        self.vacate_notices = Vec::new();

        persist(&self.storage, USERS_KEY, &self.users)?;
        persist(&self.storage, PROPERTIES_KEY, &self.properties)?;
        persist(&self.storage, UNITS_KEY, &self.units)?;
        persist(&self.storage, ASSIGNMENTS_KEY, &self.assignments)?;
        persist(&self.storage, PAYMENTS_KEY, &self.payments)?;
        persist(&self.storage, MAINTENANCE_KEY, &self.maintenance_requests)?;
        persist(&self.storage, VACATE_NOTICES_KEY, &self.vacate_notices)?;
        info!(users = self.users.len(), units = self.units.len(), "Seeded demo data");
        Ok(true)
    }

    // --- Session ---

    /// Check credentials without touching the session.
    pub fn authenticate(&self, email: &str, password: &str) -> RentifyResult<User> {
        let user = self
            .users
            .iter()
            .find(|u| u.email == email)
            .ok_or(RentifyError::InvalidCredentials)?;
        if !verify_password(password, &user.password_hash)? {
            return Err(RentifyError::InvalidCredentials);
        }
        Ok(user.clone())
    }

    /// Check credentials and remember the user as logged in.
    pub fn login(&mut self, email: &str, password: &str) -> RentifyResult<User> {
        let user = match self.authenticate(email, password) {
            Ok(user) => user,
            Err(e) => {
                warn!(email, "Login failed");
                return Err(e);
            }
        };
        self.storage.save_current_user(&user)?;
        self.current_user = Some(user.clone());
        info!(user_id = %user.id, role = %user.role, "Logged in");
        Ok(user)
    }

    pub fn logout(&mut self) -> RentifyResult<()> {
        self.current_user = None;
        self.storage.clear_current_user()?;
        info!("Logged out");
        Ok(())
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    // --- Mutations ---

    pub fn add_user(&mut self, new: NewUser, bcrypt_cost: u32) -> RentifyResult<User> {
        require("password", &new.password)?;
        let password_hash = hash_password(&new.password, bcrypt_cost)?;
        self.add_user_with_hash(new, password_hash)
    }

    /// Register a user whose password the caller already hashed.
    pub fn add_user_with_hash(&mut self, new: NewUser, password_hash: String) -> RentifyResult<User> {
        require("email", &new.email)?;
        require("name", &new.name)?;
        if self.users.iter().any(|u| u.email == new.email) {
            return Err(RentifyError::Conflict(format!("email {} is already registered", new.email)));
        }
        let user = User {
            id: fresh_id(&self.users, |u| &u.id, "user"),
            email: new.email,
            password_hash,
            role: new.role,
            name: new.name,
        };
        self.users.push(user.clone());
        persist(&self.storage, USERS_KEY, &self.users)?;
        info!(user_id = %user.id, role = %user.role, "User added");
        Ok(user)
    }

    pub fn add_property(&mut self, new: NewProperty) -> RentifyResult<Property> {
        require("name", &new.name)?;
        require("address", &new.address)?;
        self.user_with_role(&new.landlord_id, UserRole::Landlord)?;

        let property = Property {
            id: fresh_id(&self.properties, |p| &p.id, "prop"),
            landlord_id: new.landlord_id,
            name: new.name.trim().to_string(),
            address: new.address.trim().to_string(),
            created_at: self.today(),
        };
        self.properties.push(property.clone());
        persist(&self.storage, PROPERTIES_KEY, &self.properties)?;
        info!(property_id = %property.id, landlord_id = %property.landlord_id, "Property added");
        Ok(property)
    }

    pub fn add_unit(&mut self, new: NewUnit) -> RentifyResult<Unit> {
        require("name", &new.name)?;
        validate_rent(new.monthly_rent)?;
        validate_due_day(new.due_date)?;
        self.find_property(&new.property_id)?;

        let unit = Unit {
            id: fresh_id(&self.units, |u| &u.id, "unit"),
            property_id: new.property_id,
            name: new.name.trim().to_string(),
            monthly_rent: new.monthly_rent,
            due_date: new.due_date,
            grace_period_days: new.grace_period_days,
        };
        self.units.push(unit.clone());
        persist(&self.storage, UNITS_KEY, &self.units)?;
        info!(unit_id = %unit.id, property_id = %unit.property_id, "Unit added");
        Ok(unit)
    }

    pub fn update_unit(&mut self, unit_id: &str, updates: UnitUpdate) -> RentifyResult<Unit> {
        if let Some(name) = &updates.name {
            require("name", name)?;
        }
        if let Some(rent) = updates.monthly_rent {
            validate_rent(rent)?;
        }
        if let Some(day) = updates.due_date {
            validate_due_day(day)?;
        }

        let unit = self
            .units
            .iter_mut()
            .find(|u| u.id == unit_id)
            .ok_or_else(|| RentifyError::not_found("unit", unit_id))?;
        if let Some(name) = updates.name {
            unit.name = name.trim().to_string();
        }
        if let Some(rent) = updates.monthly_rent {
            unit.monthly_rent = rent;
        }
        if let Some(day) = updates.due_date {
            unit.due_date = day;
        }
        if let Some(grace) = updates.grace_period_days {
            unit.grace_period_days = grace;
        }
        let unit = unit.clone();
        persist(&self.storage, UNITS_KEY, &self.units)?;
        info!(unit_id, "Unit updated");
        Ok(unit)
    }

    /// Move a tenant into a unit. Both sides may hold one active assignment.
    pub fn assign_tenant(&mut self, new: NewAssignment) -> RentifyResult<TenantAssignment> {
        self.find_unit(&new.unit_id)?;
        self.user_with_role(&new.tenant_id, UserRole::Tenant)?;
        if let Some(existing) = self.active_assignment_for_unit(&new.unit_id) {
            return Err(RentifyError::Conflict(format!(
                "unit {} is already occupied by {}",
                new.unit_id, existing.tenant_id
            )));
        }
        if let Some(existing) = self.active_assignment_for_tenant(&new.tenant_id) {
            return Err(RentifyError::Conflict(format!(
                "tenant {} already occupies unit {}",
                new.tenant_id, existing.unit_id
            )));
        }

        let assignment = TenantAssignment {
            id: fresh_id(&self.assignments, |a| &a.id, "assign"),
            unit_id: new.unit_id,
            tenant_id: new.tenant_id,
            move_in_date: new.move_in_date,
            is_active: true,
        };
        self.assignments.push(assignment.clone());
        persist(&self.storage, ASSIGNMENTS_KEY, &self.assignments)?;
        info!(
            assignment_id = %assignment.id,
            unit_id = %assignment.unit_id,
            tenant_id = %assignment.tenant_id,
            "Tenant assigned"
        );
        Ok(assignment)
    }

    pub fn end_assignment(&mut self, assignment_id: &str) -> RentifyResult<TenantAssignment> {
        let assignment = self
            .assignments
            .iter_mut()
            .find(|a| a.id == assignment_id)
            .ok_or_else(|| RentifyError::not_found("assignment", assignment_id))?;
        if !assignment.is_active {
            return Err(RentifyError::Conflict(format!("assignment {} already ended", assignment_id)));
        }
        assignment.is_active = false;
        let assignment = assignment.clone();
        persist(&self.storage, ASSIGNMENTS_KEY, &self.assignments)?;
        info!(assignment_id, unit_id = %assignment.unit_id, "Assignment ended");
        Ok(assignment)
    }

    /// Record a completed rent payment dated today.
    pub fn make_payment(&mut self, new: NewPayment) -> RentifyResult<Payment> {
        if !new.amount.is_finite() || new.amount <= 0.0 {
            return Err(RentifyError::validation("amount must be a positive number"));
        }
        self.find_unit(&new.unit_id)?;
        self.find_user(&new.tenant_id)?;

        let payment = Payment {
            id: fresh_id(&self.payments, |p| &p.id, "pay"),
            unit_id: new.unit_id,
            tenant_id: new.tenant_id,
            amount: new.amount,
            date: self.today(),
            month: new.month,
            status: PaymentStatus::Completed,
        };
        self.payments.push(payment.clone());
        persist(&self.storage, PAYMENTS_KEY, &self.payments)?;
        info!(
            payment_id = %payment.id,
            unit_id = %payment.unit_id,
            month = %payment.month,
            amount = payment.amount,
            "Payment recorded"
        );
        Ok(payment)
    }

    pub fn add_maintenance_request(&mut self, new: NewMaintenanceRequest) -> RentifyResult<MaintenanceRequest> {
        require("description", &new.description)?;
        self.find_unit(&new.unit_id)?;
        self.find_user(&new.tenant_id)?;

        let request = MaintenanceRequest {
            id: fresh_id(&self.maintenance_requests, |r| &r.id, "maint"),
            unit_id: new.unit_id,
            tenant_id: new.tenant_id,
            description: new.description.trim().to_string(),
            status: MaintenanceStatus::Pending,
            created_at: self.today(),
            resolved_at: None,
        };
        self.maintenance_requests.push(request.clone());
        persist(&self.storage, MAINTENANCE_KEY, &self.maintenance_requests)?;
        info!(request_id = %request.id, unit_id = %request.unit_id, "Maintenance request filed");
        Ok(request)
    }

    /// Set a request's status. Resolving stamps today; reopening clears the stamp.
    pub fn update_maintenance_request(
        &mut self,
        request_id: &str,
        status: MaintenanceStatus,
    ) -> RentifyResult<MaintenanceRequest> {
        let today = self.today();
        let request = self
            .maintenance_requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or_else(|| RentifyError::not_found("maintenance request", request_id))?;
        request.status = status;
        request.resolved_at = match status {
            MaintenanceStatus::Resolved => Some(today),
            MaintenanceStatus::Pending => None,
        };
        let request = request.clone();
        persist(&self.storage, MAINTENANCE_KEY, &self.maintenance_requests)?;
        info!(request_id, ?status, "Maintenance request updated");
        Ok(request)
    }

    pub fn add_vacate_notice(&mut self, new: NewVacateNotice) -> RentifyResult<VacateNotice> {
        let today = self.today();
        if new.vacate_date < today {
            return Err(RentifyError::validation("vacate date cannot be in the past"));
        }
        self.find_unit(&new.unit_id)?;
        self.find_user(&new.tenant_id)?;
        if self
            .vacate_notices
            .iter()
            .any(|n| n.tenant_id == new.tenant_id && n.unit_id == new.unit_id)
        {
            return Err(RentifyError::Conflict(format!(
                "a vacate notice for unit {} was already submitted",
                new.unit_id
            )));
        }

        let notice = VacateNotice {
            id: fresh_id(&self.vacate_notices, |n| &n.id, "vacate"),
            unit_id: new.unit_id,
            tenant_id: new.tenant_id,
            vacate_date: new.vacate_date,
            submitted_at: today,
        };
        self.vacate_notices.push(notice.clone());
        persist(&self.storage, VACATE_NOTICES_KEY, &self.vacate_notices)?;
        info!(notice_id = %notice.id, vacate_date = %notice.vacate_date, "Vacate notice submitted");
        Ok(notice)
    }

    // --- Rent status ---

    /// Status of a unit's rent for `month` as of the store's clock.
    ///
    /// An unknown unit reads as `pending`.
    pub fn rent_status(&self, unit_id: &str, month: BillingMonth) -> RentStatus {
        match self.units.iter().find(|u| u.id == unit_id) {
            Some(unit) => rent::evaluate(unit, month, &self.payments, self.today()),
            None => {
                warn!(unit_id, %month, "Rent status requested for unknown unit");
                RentStatus::Pending
            }
        }
    }

    // --- Read access ---

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn assignments(&self) -> &[TenantAssignment] {
        &self.assignments
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn maintenance_requests(&self) -> &[MaintenanceRequest] {
        &self.maintenance_requests
    }

    pub fn vacate_notices(&self) -> &[VacateNotice] {
        &self.vacate_notices
    }

    pub fn find_user(&self, id: &str) -> RentifyResult<&User> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| RentifyError::not_found("user", id))
    }

    pub fn find_property(&self, id: &str) -> RentifyResult<&Property> {
        self.properties
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| RentifyError::not_found("property", id))
    }

    pub fn find_unit(&self, id: &str) -> RentifyResult<&Unit> {
        self.units
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| RentifyError::not_found("unit", id))
    }

    pub fn find_assignment(&self, id: &str) -> RentifyResult<&TenantAssignment> {
        self.assignments
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| RentifyError::not_found("assignment", id))
    }

    pub fn find_maintenance_request(&self, id: &str) -> RentifyResult<&MaintenanceRequest> {
        self.maintenance_requests
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| RentifyError::not_found("maintenance request", id))
    }

    pub fn active_assignment_for_unit(&self, unit_id: &str) -> Option<&TenantAssignment> {
        self.assignments.iter().find(|a| a.unit_id == unit_id && a.is_active)
    }

    pub fn active_assignment_for_tenant(&self, tenant_id: &str) -> Option<&TenantAssignment> {
        self.assignments.iter().find(|a| a.tenant_id == tenant_id && a.is_active)
    }

    pub fn properties_of(&self, landlord_id: &str) -> Vec<&Property> {
        self.properties.iter().filter(|p| p.landlord_id == landlord_id).collect()
    }

    pub fn units_of(&self, landlord_id: &str) -> Vec<&Unit> {
        self.units
            .iter()
            .filter(|u| self.unit_owned_by(u, landlord_id))
            .collect()
    }

    pub fn tenants(&self) -> Vec<&User> {
        self.users.iter().filter(|u| u.role == UserRole::Tenant).collect()
    }

    pub fn unit_owned_by(&self, unit: &Unit, landlord_id: &str) -> bool {
        self.properties
            .iter()
            .any(|p| p.id == unit.property_id && p.landlord_id == landlord_id)
    }

    fn user_with_role(&self, id: &str, role: UserRole) -> RentifyResult<&User> {
        let user = self.find_user(id)?;
        if user.role != role {
            return Err(RentifyError::validation(format!("user {} is not a {}", id, role)));
        }
        Ok(user)
    }
}

fn persist<T: Serialize>(storage: &Storage, key: &str, records: &[T]) -> RentifyResult<()> {
    storage.save_collection(key, records)?;
    debug!(key, records = records.len(), "Collection persisted");
    Ok(())
}

/// A new id that no record in `existing` carries yet.
fn fresh_id<T>(existing: &[T], id_of: impl Fn(&T) -> &String, prefix: &str) -> String {
    loop {
        let id = new_id(prefix);
        if !existing.iter().any(|r| *id_of(r) == id) {
            return id;
        }
    }
}

fn require(field: &str, value: &str) -> RentifyResult<()> {
    if value.trim().is_empty() {
        return Err(RentifyError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn validate_rent(rent: f64) -> RentifyResult<()> {
    if !rent.is_finite() || rent <= 0.0 {
        return Err(RentifyError::validation("monthly rent must be a positive number"));
    }
    Ok(())
}

fn validate_due_day(day: u32) -> RentifyResult<()> {
    if !(1..=31).contains(&day) {
        return Err(RentifyError::validation("due date must be a day of month between 1 and 31"));
    }
    Ok(())
}

//! Who may touch what. Shared by the REST handlers and the CLI.

use crate::error::{RentifyError, RentifyResult};
use crate::models::{Property, TenantAssignment, Unit, UserRole};
use crate::store::EntityStore;

pub fn require_role(actual: UserRole, needed: UserRole) -> RentifyResult<()> {
    if actual != needed {
        return Err(RentifyError::Forbidden(format!("only a {} may do this", needed)));
    }
    Ok(())
}

pub fn owned_property<'a>(store: &'a EntityStore, property_id: &str, landlord_id: &str) -> RentifyResult<&'a Property> {
    let property = store.find_property(property_id)?;
    if property.landlord_id != landlord_id {
        return Err(RentifyError::Forbidden(format!(
            "property {} belongs to another landlord",
            property_id
        )));
    }
    Ok(property)
}

/// The unit, if it sits in one of the landlord's properties.
pub fn owned_unit<'a>(store: &'a EntityStore, unit_id: &str, landlord_id: &str) -> RentifyResult<&'a Unit> {
    let unit = store.find_unit(unit_id)?;
    if !store.unit_owned_by(unit, landlord_id) {
        return Err(RentifyError::Forbidden(format!("unit {} belongs to another landlord", unit_id)));
    }
    Ok(unit)
}

/// The tenant's current assignment; tenant actions need one.
pub fn active_assignment(store: &EntityStore, tenant_id: &str) -> RentifyResult<TenantAssignment> {
    store
        .active_assignment_for_tenant(tenant_id)
        .cloned()
        .ok_or_else(|| RentifyError::validation("no unit assigned"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{date, demo_store};

    #[test]
    fn test_ownership_checks() {
        let (store, _) = demo_store(date(2026, 1, 3));
        assert!(owned_unit(&store, "unit-4", "landlord-1").is_ok());
        assert!(matches!(owned_unit(&store, "unit-4", "landlord-2"), Err(RentifyError::Forbidden(_))));
        assert!(matches!(owned_unit(&store, "unit-9", "landlord-1"), Err(RentifyError::NotFound { .. })));
        assert!(owned_property(&store, "prop-2", "landlord-1").is_ok());
        assert!(require_role(UserRole::Tenant, UserRole::Landlord).is_err());
    }

    #[test]
    fn test_active_assignment_required() {
        let (mut store, _) = demo_store(date(2026, 1, 3));
        assert_eq!(active_assignment(&store, "tenant-3").unwrap().unit_id, "unit-3");
        store.end_assignment("assign-3").unwrap();
        assert!(matches!(active_assignment(&store, "tenant-3"), Err(RentifyError::Validation(_))));
    }
}

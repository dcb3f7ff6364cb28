//! Load data script for Rentify
//!
//! Seeds the demo portfolio (one landlord, three tenants, two properties,
//! four units) into the Sled store and prints what the dashboards see.
//! Run: cargo run --bin load_data

use std::sync::Arc;

use rentify::config::AppConfig;
use rentify::rent::SystemClock;
use rentify::storage::Storage;
use rentify::store::EntityStore;
use rentify::telemetry;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let _log_guard = telemetry::init(&config);

    let storage = Storage::open(&config.data_dir)?;
    let mut store = EntityStore::open(storage, Arc::new(SystemClock))?;

    if store.seed_demo_data(config.bcrypt_cost)? {
        println!(
            "✅ Seeded {} users, {} properties, {} units into {}",
            store.users().len(),
            store.properties().len(),
            store.units().len(),
            config.data_dir
        );
    } else {
        println!("ℹ️  {} already holds data, leaving it untouched", config.data_dir);
    }

    let month = store.current_month();
    let landlord_ids: Vec<String> = store
        .properties()
        .iter()
        .map(|p| p.landlord_id.clone())
        .fold(Vec::new(), |mut ids, id| {
            if !ids.contains(&id) {
                ids.push(id);
            }
            ids
        });
    for landlord_id in &landlord_ids {
        let overview = store.rent_overview(landlord_id, month);
        println!(
            "✅ {} rent for {}: {:.2} collected of {:.2} ({} paid, {} overdue, {} pending)",
            landlord_id,
            month,
            overview.collected,
            overview.total_expected,
            overview.paid_units,
            overview.overdue_units,
            overview.pending_units
        );
    }

    for tenant in store.tenants() {
        match store.tenant_overview(&tenant.id, month) {
            Some(overview) => println!(
                "✅ {} lives in {} / {}: {}",
                tenant.name, overview.property.name, overview.unit.name, overview.rent_status
            ),
            None => println!("ℹ️  {} has no unit assigned", tenant.name),
        }
    }

    store.flush()?;
    Ok(())
}

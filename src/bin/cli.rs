use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::sync::Arc;

use rentify::access::{active_assignment, owned_property, owned_unit, require_role};
use rentify::config::AppConfig;
use rentify::error::{RentifyError, RentifyResult};
use rentify::models::{
    MaintenanceStatus, NewAssignment, NewMaintenanceRequest, NewPayment, NewProperty, NewUnit, NewUser,
    NewVacateNotice, PublicUser, UnitUpdate, User, UserRole,
};
use rentify::rent::{BillingMonth, SystemClock};
use rentify::storage::Storage;
use rentify::store::EntityStore;
use rentify::telemetry;

#[derive(Parser)]
#[command(name = "rentify-cli")]
#[command(about = "Local CLI for Rentify", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Store directory (defaults to RENTIFY_DATA_DIR)
    #[arg(short, long)]
    data_dir: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long, value_enum)]
        role: RoleArg,
    },
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    Logout,
    Whoami,
    AddProperty {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        address: String,
    },
    AddUnit {
        #[arg(short = 'P', long = "property")]
        property_id: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        rent: f64,
        #[arg(short, long, default_value_t = 1)]
        due_date: u32,
        #[arg(short, long, default_value_t = 5)]
        grace: u32,
    },
    UpdateUnit {
        #[arg(short, long)]
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        rent: Option<f64>,
        #[arg(short, long)]
        due_date: Option<u32>,
        #[arg(short, long)]
        grace: Option<u32>,
    },
    Assign {
        #[arg(short, long = "unit")]
        unit_id: String,
        #[arg(short, long = "tenant")]
        tenant_id: String,
        #[arg(short, long)]
        move_in: NaiveDate,
    },
    EndAssignment {
        #[arg(short, long)]
        id: String,
    },
    Pay {
        #[arg(short, long)]
        amount: f64,
        #[arg(short, long, value_parser = parse_month)]
        month: Option<BillingMonth>,
    },
    Request {
        #[arg(short, long)]
        description: String,
    },
    Resolve {
        #[arg(short, long)]
        id: String,
    },
    Reopen {
        #[arg(short, long)]
        id: String,
    },
    Vacate {
        #[arg(short = 'D', long)]
        date: NaiveDate,
    },
    RentStatus {
        #[arg(short, long = "unit")]
        unit_id: String,
        #[arg(short, long, value_parser = parse_month)]
        month: Option<BillingMonth>,
    },
    RentOverview {
        #[arg(short, long, value_parser = parse_month)]
        month: Option<BillingMonth>,
    },
    Overview {
        #[arg(short, long, value_parser = parse_month)]
        month: Option<BillingMonth>,
    },
    List {
        #[arg(value_enum)]
        what: ListKind,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Landlord,
    Tenant,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Landlord => UserRole::Landlord,
            RoleArg::Tenant => UserRole::Tenant,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ListKind {
    Properties,
    Units,
    Tenants,
    Payments,
    Maintenance,
    VacateNotices,
}

fn parse_month(raw: &str) -> Result<BillingMonth, String> {
    raw.parse().map_err(|e: RentifyError| e.to_string())
}

fn print_json<T: Serialize>(value: &T) -> RentifyResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn session_user(store: &EntityStore) -> RentifyResult<User> {
    store.current_user().cloned().ok_or(RentifyError::Unauthenticated)
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> RentifyResult<()> {
    let config = AppConfig::from_env()?;
    let _log_guard = telemetry::init(&config);
    let data_dir = cli.data_dir.unwrap_or(config.data_dir);
    let mut store = EntityStore::open(Storage::open(&data_dir)?, Arc::new(SystemClock))?;
    if config.seed_demo {
        store.seed_demo_data(config.bcrypt_cost)?;
    }

    match cli.command {
        Commands::Register { email, password, name, role } => {
            let user = store.add_user(
                NewUser {
                    email,
                    password,
                    role: role.into(),
                    name,
                },
                config.bcrypt_cost,
            )?;
            print_json(&PublicUser::from(&user))?;
        }
        Commands::Login { email, password } => {
            let user = store.login(&email, &password)?;
            println!("Logged in as {} ({})", user.name, user.role);
        }
        Commands::Logout => {
            store.logout()?;
            println!("Logged out.");
        }
        Commands::Whoami => match store.current_user() {
            Some(user) => print_json(&PublicUser::from(user))?,
            None => println!("Not logged in."),
        },
        Commands::AddProperty { name, address } => {
            let user = session_user(&store)?;
            require_role(user.role, UserRole::Landlord)?;
            let property = store.add_property(NewProperty {
                landlord_id: user.id,
                name,
                address,
            })?;
            print_json(&property)?;
        }
        Commands::AddUnit { property_id, name, rent, due_date, grace } => {
            let user = session_user(&store)?;
            require_role(user.role, UserRole::Landlord)?;
            owned_property(&store, &property_id, &user.id)?;
            let unit = store.add_unit(NewUnit {
                property_id,
                name,
                monthly_rent: rent,
                due_date,
                grace_period_days: grace,
            })?;
            print_json(&unit)?;
        }
        Commands::UpdateUnit { id, name, rent, due_date, grace } => {
            let user = session_user(&store)?;
            require_role(user.role, UserRole::Landlord)?;
            owned_unit(&store, &id, &user.id)?;
            let unit = store.update_unit(
                &id,
                UnitUpdate {
                    name,
                    monthly_rent: rent,
                    due_date,
                    grace_period_days: grace,
                },
            )?;
            print_json(&unit)?;
        }
        Commands::Assign { unit_id, tenant_id, move_in } => {
            let user = session_user(&store)?;
            require_role(user.role, UserRole::Landlord)?;
            owned_unit(&store, &unit_id, &user.id)?;
            let assignment = store.assign_tenant(NewAssignment {
                unit_id,
                tenant_id,
                move_in_date: move_in,
            })?;
            print_json(&assignment)?;
        }
        Commands::EndAssignment { id } => {
            let user = session_user(&store)?;
            require_role(user.role, UserRole::Landlord)?;
            let unit_id = store.find_assignment(&id)?.unit_id.clone();
            owned_unit(&store, &unit_id, &user.id)?;
            print_json(&store.end_assignment(&id)?)?;
        }
        Commands::Pay { amount, month } => {
            let user = session_user(&store)?;
            require_role(user.role, UserRole::Tenant)?;
            let assignment = active_assignment(&store, &user.id)?;
            let month = month.unwrap_or_else(|| store.current_month());
            let payment = store.make_payment(NewPayment {
                unit_id: assignment.unit_id,
                tenant_id: user.id,
                amount,
                month,
            })?;
            print_json(&payment)?;
        }
        Commands::Request { description } => {
            let user = session_user(&store)?;
            require_role(user.role, UserRole::Tenant)?;
            let assignment = active_assignment(&store, &user.id)?;
            let request = store.add_maintenance_request(NewMaintenanceRequest {
                unit_id: assignment.unit_id,
                tenant_id: user.id,
                description,
            })?;
            print_json(&request)?;
        }
        Commands::Resolve { id } => set_maintenance_status(&mut store, &id, MaintenanceStatus::Resolved)?,
        Commands::Reopen { id } => set_maintenance_status(&mut store, &id, MaintenanceStatus::Pending)?,
        Commands::Vacate { date } => {
            let user = session_user(&store)?;
            require_role(user.role, UserRole::Tenant)?;
            let assignment = active_assignment(&store, &user.id)?;
            let notice = store.add_vacate_notice(NewVacateNotice {
                unit_id: assignment.unit_id,
                tenant_id: user.id,
                vacate_date: date,
            })?;
            print_json(&notice)?;
        }
        Commands::RentStatus { unit_id, month } => {
            let user = session_user(&store)?;
            match user.role {
                UserRole::Landlord => {
                    owned_unit(&store, &unit_id, &user.id)?;
                }
                UserRole::Tenant => {
                    if active_assignment(&store, &user.id)?.unit_id != unit_id {
                        return Err(RentifyError::Forbidden(format!("unit {} is not yours", unit_id)));
                    }
                }
            }
            let month = month.unwrap_or_else(|| store.current_month());
            println!("{} {}: {}", unit_id, month, store.rent_status(&unit_id, month));
        }
        Commands::RentOverview { month } => {
            let user = session_user(&store)?;
            require_role(user.role, UserRole::Landlord)?;
            let month = month.unwrap_or_else(|| store.current_month());
            print_json(&store.rent_overview(&user.id, month))?;
        }
        Commands::Overview { month } => {
            let user = session_user(&store)?;
            require_role(user.role, UserRole::Tenant)?;
            let month = month.unwrap_or_else(|| store.current_month());
            match store.tenant_overview(&user.id, month) {
                Some(overview) => print_json(&overview)?,
                None => println!("No unit assigned. Contact your landlord for unit assignment."),
            }
        }
        Commands::List { what } => list(&store, what)?,
    }

    store.flush()
}

fn set_maintenance_status(store: &mut EntityStore, id: &str, status: MaintenanceStatus) -> RentifyResult<()> {
    let user = session_user(store)?;
    require_role(user.role, UserRole::Landlord)?;
    let unit_id = store.find_maintenance_request(id)?.unit_id.clone();
    owned_unit(store, &unit_id, &user.id)?;
    print_json(&store.update_maintenance_request(id, status)?)
}

fn list(store: &EntityStore, what: ListKind) -> RentifyResult<()> {
    let user = session_user(store)?;
    match (what, user.role) {
        (ListKind::Properties, UserRole::Landlord) => print_json(&store.properties_of(&user.id)),
        (ListKind::Units, UserRole::Landlord) => print_json(&store.units_of(&user.id)),
        (ListKind::Tenants, UserRole::Landlord) => {
            let tenants: Vec<PublicUser> = store.tenants().into_iter().map(PublicUser::from).collect();
            print_json(&tenants)
        }
        (ListKind::Payments, UserRole::Tenant) => {
            let payments: Vec<_> = store.payments().iter().filter(|p| p.tenant_id == user.id).collect();
            print_json(&payments)
        }
        (ListKind::Payments, UserRole::Landlord) => {
            let payments: Vec<_> = store
                .payments()
                .iter()
                .filter(|p| {
                    store
                        .find_unit(&p.unit_id)
                        .map(|u| store.unit_owned_by(u, &user.id))
                        .unwrap_or(false)
                })
                .collect();
            print_json(&payments)
        }
        (ListKind::Maintenance, UserRole::Landlord) => print_json(&store.maintenance_board(&user.id)),
        (ListKind::Maintenance, UserRole::Tenant) => print_json(&store.tenant_maintenance_board(&user.id)),
        (ListKind::VacateNotices, UserRole::Landlord) => print_json(&store.vacate_notices_for_landlord(&user.id)),
        (_, role) => Err(RentifyError::Forbidden(format!("a {} cannot list that", role))),
    }
}

//! REST API layer for Rentify using Axum (exposed on port 11111)
//!
//! Landlord routes manage properties, units, assignments and maintenance;
//! tenant routes pay rent, file requests and give notice. Every route but
//! `/health`, `/register` and `/login` needs a bearer JWT.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Request, State,
    },
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{error, info};

use crate::access::{active_assignment, owned_property, owned_unit, require_role};
use crate::auth::{create_jwt, hash_password, validate_jwt};
use crate::config::AppConfig;
use crate::dashboard::{MaintenanceBoard, PropertyStats, RentOverview, TenantOverview, VacateNoticeLine};
use crate::error::{RentifyError, RentifyResult};
use crate::models::{
    AuthPayload, MaintenanceRequest, MaintenanceStatus, NewAssignment, NewMaintenanceRequest, NewPayment,
    NewProperty, NewUnit, NewUser, NewVacateNotice, Payment, Property, PublicUser, TenantAssignment, Unit,
    UnitUpdate, UserRole, VacateNotice,
};
use crate::rent::{BillingMonth, RentStatus};
use crate::store::EntityStore;

/// Shared app state for REST handlers (Arc-wrapped for concurrency)
pub struct AppState {
    store: RwLock<EntityStore>,
    config: AppConfig,
}

impl AppState {
    fn read(&self) -> RentifyResult<RwLockReadGuard<'_, EntityStore>> {
        self.store
            .read()
            .map_err(|_| RentifyError::Internal("store lock poisoned".to_string()))
    }

    fn write(&self) -> RentifyResult<RwLockWriteGuard<'_, EntityStore>> {
        self.store
            .write()
            .map_err(|_| RentifyError::Internal("store lock poisoned".to_string()))
    }
}

#[derive(Deserialize, Serialize)]
pub struct LoginRest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Generic REST response (JSON)
#[derive(Serialize)]
pub struct RestResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize)]
pub struct MonthQuery {
    pub month: Option<BillingMonth>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRest {
    pub name: String,
    pub address: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTenantRest {
    pub tenant_id: String,
    pub move_in_date: NaiveDate,
}

#[derive(Deserialize)]
pub struct PaymentRest {
    pub amount: f64,
    /// Defaults to the current month.
    pub month: Option<BillingMonth>,
}

#[derive(Deserialize)]
pub struct MaintenanceRest {
    pub description: String,
}

#[derive(Deserialize)]
pub struct MaintenanceStatusRest {
    pub status: MaintenanceStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacateRest {
    pub vacate_date: NaiveDate,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRentStatus {
    pub unit_id: String,
    pub month: BillingMonth,
    pub status: RentStatus,
}

/// `Json` whose rejections answer with the usual error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(RentifyError))]
pub struct AppJson<T>(pub T);

/// `Query` whose rejections answer with the usual error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(RentifyError))]
pub struct AppQuery<T>(pub T);

impl From<JsonRejection> for RentifyError {
    fn from(rejection: JsonRejection) -> Self {
        RentifyError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for RentifyError {
    fn from(rejection: QueryRejection) -> Self {
        RentifyError::Validation(rejection.body_text())
    }
}

impl IntoResponse for RentifyError {
    fn into_response(self) -> Response {
        let status = match &self {
            RentifyError::NotFound { .. } => StatusCode::NOT_FOUND,
            RentifyError::Conflict(_) => StatusCode::CONFLICT,
            RentifyError::InvalidCredentials | RentifyError::Unauthenticated | RentifyError::Token(_) => {
                StatusCode::UNAUTHORIZED
            }
            RentifyError::Validation(_) => StatusCode::BAD_REQUEST,
            RentifyError::Forbidden(_) => StatusCode::FORBIDDEN,
            RentifyError::Storage(_)
            | RentifyError::Serialization(_)
            | RentifyError::Password(_)
            | RentifyError::Internal(_) => {
                error!(error = %self, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = RestResponse {
            success: false,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, RentifyError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(RentifyError::Unauthenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(RentifyError::Unauthenticated)?;
    let claims = validate_jwt(token, state.config.jwt_secret.as_bytes())?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Create Axum router over a loaded store
pub fn create_router(store: EntityStore, config: AppConfig) -> Router {
    let state = Arc::new(AppState {
        store: RwLock::new(store),
        config,
    });

    let auth_routes = Router::new()
        .route("/me", get(me_handler))
        .route("/properties", get(list_properties_handler).post(create_property_handler))
        .route("/properties/:property_id/stats", get(property_stats_handler))
        .route("/units", get(list_units_handler).post(create_unit_handler))
        .route("/units/:unit_id", patch(update_unit_handler))
        .route("/units/:unit_id/assignments", post(assign_tenant_handler))
        .route("/units/:unit_id/rent-status", get(unit_rent_status_handler))
        .route("/assignments/:assignment_id/end", post(end_assignment_handler))
        .route("/tenants", get(list_tenants_handler))
        .route("/rent", get(rent_overview_handler))
        .route("/payments", get(list_payments_handler).post(create_payment_handler))
        .route("/maintenance", get(list_maintenance_handler).post(create_maintenance_handler))
        .route("/maintenance/:request_id", put(update_maintenance_handler))
        .route("/vacate-notices", get(list_vacate_notices_handler).post(create_vacate_notice_handler))
        .route("/overview", get(tenant_overview_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/health", get(health_handler))
        .merge(auth_routes)
        .with_state(state)
}

async fn health_handler() -> Json<RestResponse> {
    Json(RestResponse {
        success: true,
        message: "Rentify REST API healthy".to_string(),
    })
}

async fn register_handler(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<NewUser>,
) -> Result<(StatusCode, Json<PublicUser>), RentifyError> {
    if payload.password.trim().is_empty() {
        return Err(RentifyError::validation("password is required"));
    }
    let password = payload.password.clone();
    let cost = state.config.bcrypt_cost;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| RentifyError::Internal(format!("password hashing task failed: {}", e)))??;
    let user = state.write()?.add_user_with_hash(payload, password_hash)?;
    Ok((StatusCode::CREATED, Json(PublicUser::from(&user))))
}

async fn login_handler(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<LoginRest>,
) -> Result<Json<LoginResponse>, RentifyError> {
    let user = state.read()?.authenticate(&payload.email, &payload.password)?;
    let token = create_jwt(&user, state.config.jwt_secret.as_bytes(), state.config.token_ttl_secs)?;
    info!(user_id = %user.id, "Issued session token");
    Ok(Json(LoginResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
) -> Result<Json<PublicUser>, RentifyError> {
    let store = state.read()?;
    Ok(Json(PublicUser::from(store.find_user(&claims.sub)?)))
}

async fn list_properties_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
) -> Result<Json<Vec<Property>>, RentifyError> {
    require_role(claims.role, UserRole::Landlord)?;
    let store = state.read()?;
    Ok(Json(store.properties_of(&claims.sub).into_iter().cloned().collect()))
}

async fn create_property_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
    AppJson(payload): AppJson<CreatePropertyRest>,
) -> Result<(StatusCode, Json<Property>), RentifyError> {
    require_role(claims.role, UserRole::Landlord)?;
    let property = state.write()?.add_property(NewProperty {
        landlord_id: claims.sub,
        name: payload.name,
        address: payload.address,
    })?;
    Ok((StatusCode::CREATED, Json(property)))
}

async fn property_stats_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
    Path(property_id): Path<String>,
) -> Result<Json<PropertyStats>, RentifyError> {
    require_role(claims.role, UserRole::Landlord)?;
    let store = state.read()?;
    owned_property(&store, &property_id, &claims.sub)?;
    Ok(Json(store.property_stats(&property_id)?))
}

async fn list_units_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
) -> Result<Json<Vec<Unit>>, RentifyError> {
    let store = state.read()?;
    let units = match claims.role {
        UserRole::Landlord => store.units_of(&claims.sub).into_iter().cloned().collect(),
        UserRole::Tenant => store
            .active_assignment_for_tenant(&claims.sub)
            .and_then(|a| store.find_unit(&a.unit_id).ok())
            .cloned()
            .into_iter()
            .collect(),
    };
    Ok(Json(units))
}

async fn create_unit_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
    AppJson(payload): AppJson<NewUnit>,
) -> Result<(StatusCode, Json<Unit>), RentifyError> {
    require_role(claims.role, UserRole::Landlord)?;
    let mut store = state.write()?;
    owned_property(&store, &payload.property_id, &claims.sub)?;
    let unit = store.add_unit(payload)?;
    Ok((StatusCode::CREATED, Json(unit)))
}

async fn update_unit_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
    Path(unit_id): Path<String>,
    AppJson(payload): AppJson<UnitUpdate>,
) -> Result<Json<Unit>, RentifyError> {
    require_role(claims.role, UserRole::Landlord)?;
    let mut store = state.write()?;
    owned_unit(&store, &unit_id, &claims.sub)?;
    Ok(Json(store.update_unit(&unit_id, payload)?))
}

async fn assign_tenant_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
    Path(unit_id): Path<String>,
    AppJson(payload): AppJson<AssignTenantRest>,
) -> Result<(StatusCode, Json<TenantAssignment>), RentifyError> {
    require_role(claims.role, UserRole::Landlord)?;
    let mut store = state.write()?;
    owned_unit(&store, &unit_id, &claims.sub)?;
    let assignment = store.assign_tenant(NewAssignment {
        unit_id,
        tenant_id: payload.tenant_id,
        move_in_date: payload.move_in_date,
    })?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn end_assignment_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
    Path(assignment_id): Path<String>,
) -> Result<Json<TenantAssignment>, RentifyError> {
    require_role(claims.role, UserRole::Landlord)?;
    let mut store = state.write()?;
    let unit_id = store.find_assignment(&assignment_id)?.unit_id.clone();
    owned_unit(&store, &unit_id, &claims.sub)?;
    Ok(Json(store.end_assignment(&assignment_id)?))
}

async fn list_tenants_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
) -> Result<Json<Vec<PublicUser>>, RentifyError> {
    require_role(claims.role, UserRole::Landlord)?;
    let store = state.read()?;
    Ok(Json(store.tenants().into_iter().map(PublicUser::from).collect()))
}

async fn unit_rent_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
    Path(unit_id): Path<String>,
    AppQuery(query): AppQuery<MonthQuery>,
) -> Result<Json<UnitRentStatus>, RentifyError> {
    let store = state.read()?;
    match claims.role {
        UserRole::Landlord => {
            owned_unit(&store, &unit_id, &claims.sub)?;
        }
        UserRole::Tenant => {
            if active_assignment(&store, &claims.sub)?.unit_id != unit_id {
                return Err(RentifyError::Forbidden(format!("unit {} is not yours", unit_id)));
            }
        }
    }
    let month = query.month.unwrap_or_else(|| store.current_month());
    Ok(Json(UnitRentStatus {
        status: store.rent_status(&unit_id, month),
        unit_id,
        month,
    }))
}

async fn rent_overview_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
    AppQuery(query): AppQuery<MonthQuery>,
) -> Result<Json<RentOverview>, RentifyError> {
    require_role(claims.role, UserRole::Landlord)?;
    let store = state.read()?;
    let month = query.month.unwrap_or_else(|| store.current_month());
    Ok(Json(store.rent_overview(&claims.sub, month)))
}

async fn list_payments_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
) -> Result<Json<Vec<Payment>>, RentifyError> {
    let store = state.read()?;
    let payments = store
        .payments()
        .iter()
        .filter(|p| match claims.role {
            UserRole::Tenant => p.tenant_id == claims.sub,
            UserRole::Landlord => store
                .find_unit(&p.unit_id)
                .map(|u| store.unit_owned_by(u, &claims.sub))
                .unwrap_or(false),
        })
        .cloned()
        .collect();
    Ok(Json(payments))
}

async fn create_payment_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
    AppJson(payload): AppJson<PaymentRest>,
) -> Result<(StatusCode, Json<Payment>), RentifyError> {
    require_role(claims.role, UserRole::Tenant)?;
    let mut store = state.write()?;
    let assignment = active_assignment(&store, &claims.sub)?;
    let month = payload.month.unwrap_or_else(|| store.current_month());
    let payment = store.make_payment(NewPayment {
        unit_id: assignment.unit_id,
        tenant_id: claims.sub,
        amount: payload.amount,
        month,
    })?;
    Ok((StatusCode::CREATED, Json(payment)))
}

async fn list_maintenance_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
) -> Result<Json<MaintenanceBoard>, RentifyError> {
    let store = state.read()?;
    let board = match claims.role {
        UserRole::Landlord => store.maintenance_board(&claims.sub),
        UserRole::Tenant => store.tenant_maintenance_board(&claims.sub),
    };
    Ok(Json(board))
}

async fn create_maintenance_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
    AppJson(payload): AppJson<MaintenanceRest>,
) -> Result<(StatusCode, Json<MaintenanceRequest>), RentifyError> {
    require_role(claims.role, UserRole::Tenant)?;
    let mut store = state.write()?;
    let assignment = active_assignment(&store, &claims.sub)?;
    let request = store.add_maintenance_request(NewMaintenanceRequest {
        unit_id: assignment.unit_id,
        tenant_id: claims.sub,
        description: payload.description,
    })?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn update_maintenance_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
    Path(request_id): Path<String>,
    AppJson(payload): AppJson<MaintenanceStatusRest>,
) -> Result<Json<MaintenanceRequest>, RentifyError> {
    require_role(claims.role, UserRole::Landlord)?;
    let mut store = state.write()?;
    let unit_id = store.find_maintenance_request(&request_id)?.unit_id.clone();
    owned_unit(&store, &unit_id, &claims.sub)?;
    Ok(Json(store.update_maintenance_request(&request_id, payload.status)?))
}

async fn list_vacate_notices_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
) -> Result<Json<Vec<VacateNoticeLine>>, RentifyError> {
    require_role(claims.role, UserRole::Landlord)?;
    let store = state.read()?;
    Ok(Json(store.vacate_notices_for_landlord(&claims.sub)))
}

async fn create_vacate_notice_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
    AppJson(payload): AppJson<VacateRest>,
) -> Result<(StatusCode, Json<VacateNotice>), RentifyError> {
    require_role(claims.role, UserRole::Tenant)?;
    let mut store = state.write()?;
    let assignment = active_assignment(&store, &claims.sub)?;
    let notice = store.add_vacate_notice(NewVacateNotice {
        unit_id: assignment.unit_id,
        tenant_id: claims.sub,
        vacate_date: payload.vacate_date,
    })?;
    Ok((StatusCode::CREATED, Json(notice)))
}

async fn tenant_overview_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthPayload>,
    AppQuery(query): AppQuery<MonthQuery>,
) -> Result<Json<TenantOverview>, RentifyError> {
    require_role(claims.role, UserRole::Tenant)?;
    let store = state.read()?;
    let month = query.month.unwrap_or_else(|| store.current_month());
    store
        .tenant_overview(&claims.sub, month)
        .map(Json)
        .ok_or_else(|| RentifyError::not_found("assignment", claims.sub.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rent::FixedClock;
    use crate::storage::Storage;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use tower::ServiceExt; // For .oneshot() testing

    fn test_app() -> Router {
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2026, 1, 4).unwrap()));
        let mut store = EntityStore::open(Storage::temporary().unwrap(), clock).unwrap();
        store.seed_demo_data(4).unwrap();
        let config = AppConfig {
            jwt_secret: "rest-test-secret".to_string(),
            bcrypt_cost: 4,
            ..AppConfig::default()
        };
        create_router(store, config)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.expect("request");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method("GET")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    async fn login(app: &Router, email: &str) -> String {
        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/login",
                None,
                serde_json::json!({"email": email, "password": "password123"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_and_login() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .expect("Health request");
        assert_eq!(response.status(), StatusCode::OK);

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/login",
                None,
                serde_json::json!({"email": "landlord@test.com", "password": "nope"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid email or password");

        let token = login(&app, "landlord@test.com").await;
        let (status, me) = send(&app, get_request("/me", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["id"], "landlord-1");
        assert!(me.get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let app = test_app();
        let body = serde_json::json!({
            "email": "new@test.com",
            "password": "secret",
            "role": "tenant",
            "name": "New Tenant"
        });
        let (status, user) = send(&app, json_request("POST", "/register", None, body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user["role"], "tenant");
        assert!(user.get("passwordHash").is_none());

        let (status, _) = send(&app, json_request("POST", "/register", None, body)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/login",
                None,
                serde_json::json!({"email": "new@test.com", "password": "secret"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_bad_bodies_answer_with_json_errors() {
        let app = test_app();
        let landlord = login(&app, "landlord@test.com").await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/units",
                Some(&landlord),
                serde_json::json!({
                    "propertyId": "prop-1",
                    "name": "Unit 9",
                    "monthlyRent": 900.0,
                    "dueDate": -1,
                    "gracePeriodDays": 5
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let malformed = Request::builder()
            .uri("/properties")
            .method("POST")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", landlord))
            .body(Body::from("{\"name\": "))
            .unwrap();
        let (status, body) = send(&app, malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_protected_routes_need_token() {
        let app = test_app();
        let (status, _) = send(
            &app,
            Request::builder().uri("/properties").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, get_request("/properties", "not-a-jwt")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_landlord_rent_overview_and_roles() {
        let app = test_app();
        let landlord = login(&app, "landlord@test.com").await;
        let tenant = login(&app, "tenant2@test.com").await;

        let (status, overview) = send(&app, get_request("/rent?month=2026-01", &landlord)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(overview["paidUnits"], 1);
        assert_eq!(overview["overdueUnits"], 2);
        assert_eq!(overview["month"], "2026-01");

        let (status, _) = send(&app, get_request("/rent", &tenant)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&app, get_request("/rent?month=2026-13", &landlord)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("month 13 out of range"));

        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/properties",
                Some(&tenant),
                serde_json::json!({"name": "Mine", "address": "1 Way"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_tenant_pays_and_status_turns_paid() {
        let app = test_app();
        let landlord = login(&app, "landlord@test.com").await;
        let tenant = login(&app, "tenant2@test.com").await;

        let (_, before) = send(&app, get_request("/units/unit-2/rent-status?month=2026-01", &tenant)).await;
        assert_eq!(before["status"], "overdue-grace");

        let (status, payment) = send(
            &app,
            json_request("POST", "/payments", Some(&tenant), serde_json::json!({"amount": 1350.0})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(payment["month"], "2026-01");
        assert_eq!(payment["unitId"], "unit-2");

        let (_, after) = send(&app, get_request("/units/unit-2/rent-status?month=2026-01", &landlord)).await;
        assert_eq!(after["status"], "paid");

        // Tenants only see their own unit
        let (status, _) = send(&app, get_request("/units/unit-1/rent-status", &tenant)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_assignment_conflict_and_maintenance_flow() {
        let app = test_app();
        let landlord = login(&app, "landlord@test.com").await;
        let tenant = login(&app, "tenant1@test.com").await;

        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/units/unit-1/assignments",
                Some(&landlord),
                serde_json::json!({"tenantId": "tenant-3", "moveInDate": "2026-02-01"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, request) = send(
            &app,
            json_request(
                "POST",
                "/maintenance",
                Some(&tenant),
                serde_json::json!({"description": "Door sticks"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = request["id"].as_str().unwrap().to_string();

        let (status, resolved) = send(
            &app,
            json_request(
                "PUT",
                &format!("/maintenance/{}", id),
                Some(&landlord),
                serde_json::json!({"status": "resolved"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resolved["resolvedAt"], "2026-01-04");

        let (_, board) = send(&app, get_request("/maintenance", &tenant)).await;
        assert_eq!(board["resolved"].as_array().unwrap().len(), 1);
        assert_eq!(board["pending"].as_array().unwrap().len(), 1);
    }
}

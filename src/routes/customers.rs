use crate::{
    auth::middleware::UserExtractor,
    database::{
        dao::CustomerChanges,
        entities::CustomerRecord,
    },
    error::AppError,
    server::Server,
};
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

pub fn create_customer_routes() -> Router<Server> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub balance_due: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount_paid: Option<Decimal>,
}

impl From<CustomerRequest> for CustomerChanges {
    fn from(request: CustomerRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            phone_number: request.phone_number,
            billing_address: request.billing_address,
            shipping_address: request.shipping_address,
            balance_due: request.balance_due,
            amount_paid: request.amount_paid,
        }
    }
}

fn customer_not_found() -> AppError {
    AppError::NotFound("Customer not found".to_string())
}

async fn create_customer(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
    Json(request): Json<CustomerRequest>,
) -> Result<(StatusCode, Json<CustomerRecord>), AppError> {
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::BadRequest("Customer name is required".to_string()))?;

    let mut record = CustomerRecord::new(user.id, name);
    record.email = request.email;
    record.phone_number = request.phone_number;
    record.billing_address = request.billing_address;
    record.shipping_address = request.shipping_address;
    record.balance_due = request.balance_due.unwrap_or_default();
    record.amount_paid = request.amount_paid.unwrap_or_default();

    let customer = server.database.customers().create(&record).await?;
    info!(user_id = user.id, customer_id = customer.id, "Customer created");

    Ok((StatusCode::CREATED, Json(customer)))
}

async fn list_customers(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
) -> Result<Json<Vec<CustomerRecord>>, AppError> {
    let customers = server.database.customers().list_for_owner(user.id).await?;
    Ok(Json(customers))
}

async fn get_customer(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
    Path(id): Path<i32>,
) -> Result<Json<CustomerRecord>, AppError> {
    server
        .database
        .customers()
        .find_for_owner(user.id, id)
        .await?
        .map(Json)
        .ok_or_else(customer_not_found)
}

async fn update_customer(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
    Path(id): Path<i32>,
    Json(request): Json<CustomerRequest>,
) -> Result<Json<CustomerRecord>, AppError> {
    if matches!(request.name.as_deref().map(str::trim), Some("")) {
        return Err(AppError::BadRequest(
            "Customer name cannot be empty".to_string(),
        ));
    }

    let updated = server
        .database
        .customers()
        .update(user.id, id, request.into())
        .await?;
    Ok(Json(updated))
}

async fn delete_customer(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !server.database.customers().delete(user.id, id).await? {
        return Err(customer_not_found());
    }

    info!(user_id = user.id, customer_id = id, "Customer deleted");
    Ok(Json(serde_json::json!({
        "message": "Customer deleted successfully"
    })))
}

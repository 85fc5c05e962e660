use crate::{
    auth::middleware::UserExtractor,
    database::{
        InvoiceQuery,
        dao::InvoiceChanges,
        entities::{InvoiceItem, InvoiceItems, InvoiceRecord, InvoiceStatus, PaymentInfo},
    },
    error::AppError,
    server::Server,
};
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

const MAX_PAGE_SIZE: u32 = 500;

pub fn create_invoice_routes() -> Router<Server> {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route(
            "/{id}",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    #[serde(alias = "customer")]
    pub customer_id: Option<i32>,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub items: Option<Vec<InvoiceItem>>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_amount: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount_paid: Option<Decimal>,
    pub payment_info: Option<PaymentInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceListQuery {
    pub status: Option<InvoiceStatus>,
    pub customer_id: Option<i32>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

fn invoice_not_found() -> AppError {
    AppError::NotFound("Invoice not found".to_string())
}

async fn create_invoice(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
    Json(request): Json<InvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceRecord>), AppError> {
    let customer_id = request
        .customer_id
        .ok_or_else(|| AppError::BadRequest("Customer is required".to_string()))?;

    // The customer must be one of the owner's own
    server
        .database
        .customers()
        .find_for_owner(user.id, customer_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Customer not found".to_string()))?;

    let mut record = InvoiceRecord::new(user.id, customer_id, request.items.unwrap_or_default());
    if let Some(total_amount) = request.total_amount {
        record = record.with_total_amount(total_amount);
    }
    if let Some(status) = request.status {
        record = record.with_status(status);
    }
    record.billing_address = request.billing_address;
    record.shipping_address = request.shipping_address;
    record.email = request.email;
    record.phone = request.phone;
    record.amount_paid = request.amount_paid.unwrap_or_default();
    record.payment_info = request.payment_info;

    let invoice = server.database.invoices().create(&record).await?;
    info!(
        user_id = user.id,
        invoice_id = invoice.id,
        total = %invoice.total_amount,
        "Invoice created"
    );

    Ok((StatusCode::CREATED, Json(invoice)))
}

async fn list_invoices(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
    Query(params): Query<InvoiceListQuery>,
) -> Result<Json<Vec<InvoiceRecord>>, AppError> {
    let query = InvoiceQuery {
        user_id: Some(user.id),
        customer_id: params.customer_id,
        statuses: params.status.map(|status| vec![status]),
        limit: params.limit.map(|limit| limit.min(MAX_PAGE_SIZE)),
        offset: params.offset,
        ..Default::default()
    };

    let invoices = server.database.invoices().get_records(&query).await?;
    Ok(Json(invoices))
}

async fn get_invoice(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
    Path(id): Path<i32>,
) -> Result<Json<InvoiceRecord>, AppError> {
    server
        .database
        .invoices()
        .find_for_owner(user.id, id)
        .await?
        .map(Json)
        .ok_or_else(invoice_not_found)
}

async fn update_invoice(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
    Path(id): Path<i32>,
    Json(request): Json<InvoiceRequest>,
) -> Result<Json<InvoiceRecord>, AppError> {
    let items = request.items.map(InvoiceItems);
    // New items without an explicit total re-derive it
    let total_amount = request
        .total_amount
        .or_else(|| items.as_ref().map(InvoiceItems::total));

    let changes = InvoiceChanges {
        billing_address: request.billing_address,
        shipping_address: request.shipping_address,
        email: request.email,
        phone: request.phone,
        status: request.status,
        items,
        total_amount,
        amount_paid: request.amount_paid,
        payment_info: request.payment_info,
    };

    let updated = server.database.invoices().update(user.id, id, changes).await?;
    Ok(Json(updated))
}

async fn delete_invoice(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !server.database.invoices().delete(user.id, id).await? {
        return Err(invoice_not_found());
    }

    info!(user_id = user.id, invoice_id = id, "Invoice deleted");
    Ok(Json(serde_json::json!({
        "message": "Invoice deleted successfully"
    })))
}

#[cfg(test)]
mod tests {
    use crate::database::entities::{CustomerRecord, InvoiceRecord};
    use crate::test_utils::{
        TestServerBuilder, bearer, create_test_user, json_request, response_json,
    };
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_create_derives_total_from_items() {
        let server = TestServerBuilder::new().build().await;
        let user = create_test_user(&server, "inv@example.com").await;
        let customer = server
            .database
            .customers()
            .create(&CustomerRecord::new(user.id, "Acme"))
            .await
            .unwrap();
        let token = bearer(&server, user.id);

        let create = json_request(
            "POST",
            "/api/invoices",
            Some(&token),
            Some(json!({
                "customer": customer.id,
                "items": [
                    {"name": "Widget", "quantity": 2, "price": 10.25, "total": 20.5},
                    {"name": "Gadget", "quantity": 1, "price": 4.5, "total": 4.5}
                ]
            })),
        );
        let response = server.create_app().oneshot(create).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response_json(response).await;
        assert_eq!(body["totalAmount"], 25.0);
        assert_eq!(body["status"], "unpaid");
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
        let id = body["id"].as_i64().unwrap();

        let update = json_request(
            "PUT",
            &format!("/api/invoices/{}", id),
            Some(&token),
            Some(json!({"status": "paid", "amountPaid": 25})),
        );
        let response = server.create_app().oneshot(update).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["status"], "paid");
        assert_eq!(body["amountPaid"], 25.0);
        assert_eq!(body["totalAmount"], 25.0);
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_customer() {
        let server = TestServerBuilder::new().build().await;
        let owner = create_test_user(&server, "owner@example.com").await;
        let other = create_test_user(&server, "other@example.com").await;
        let foreign = server
            .database
            .customers()
            .create(&CustomerRecord::new(other.id, "Not yours"))
            .await
            .unwrap();

        let token = bearer(&server, owner.id);
        for body in [json!({"customerId": foreign.id}), json!({"items": []})] {
            let create = json_request("POST", "/api/invoices", Some(&token), Some(body));
            let response = server.create_app().oneshot(create).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_filterable() {
        let server = TestServerBuilder::new().build().await;
        let owner = create_test_user(&server, "owner@example.com").await;
        let other = create_test_user(&server, "other@example.com").await;
        let token = bearer(&server, owner.id);

        for (user, status) in [(&owner, "paid"), (&owner, "partial"), (&other, "paid")] {
            let customer = server
                .database
                .customers()
                .create(&CustomerRecord::new(user.id, "C"))
                .await
                .unwrap();
            let create = json_request(
                "POST",
                "/api/invoices",
                Some(&bearer(&server, user.id)),
                Some(json!({"customerId": customer.id, "status": status, "totalAmount": 10})),
            );
            let response = server.create_app().oneshot(create).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let all = json_request("GET", "/api/invoices", Some(&token), None);
        let response = server.create_app().oneshot(all).await.unwrap();
        assert_eq!(response_json(response).await.as_array().unwrap().len(), 2);

        let partial = json_request("GET", "/api/invoices?status=partial", Some(&token), None);
        let response = server.create_app().oneshot(partial).await.unwrap();
        let body = response_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["status"], "partial");
    }

    #[tokio::test]
    async fn test_missing_invoice() {
        let server = TestServerBuilder::new().build().await;
        let user = create_test_user(&server, "missing@example.com").await;
        let token = bearer(&server, user.id);

        for method in ["GET", "DELETE"] {
            let request = json_request(method, "/api/invoices/4242", Some(&token), None);
            let response = server.create_app().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }

        let update = json_request(
            "PUT",
            "/api/invoices/4242",
            Some(&token),
            Some(json!({"status": "paid"})),
        );
        let response = server.create_app().oneshot(update).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_paging_with_offset_only() {
        let server = TestServerBuilder::new().build().await;
        let user = create_test_user(&server, "pages@example.com").await;
        let customer = server
            .database
            .customers()
            .create(&CustomerRecord::new(user.id, "Acme"))
            .await
            .unwrap();

        let now = Utc::now();
        for (days_ago, amount) in [(3, 30), (2, 20), (1, 10)] {
            let invoice = InvoiceRecord::new(user.id, customer.id, vec![])
                .with_total_amount(Decimal::from(amount))
                .with_created_at(now - Duration::days(days_ago));
            server.database.invoices().create(&invoice).await.unwrap();
        }
        let token = bearer(&server, user.id);

        let request = json_request("GET", "/api/invoices?offset=1", Some(&token), None);
        let response = server.create_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        let totals: Vec<f64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|invoice| invoice["totalAmount"].as_f64().unwrap())
            .collect();
        assert_eq!(totals, vec![20.0, 30.0]);

        let request = json_request("GET", "/api/invoices?limit=1&offset=1", Some(&token), None);
        let response = server.create_app().oneshot(request).await.unwrap();
        let body = response_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["totalAmount"], 20.0);
    }
}

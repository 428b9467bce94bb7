//! # Request Handlers
//!
//! Each handler resolves the session from the bearer token, calls the
//! matching command with the caller's slice of the
//! [`AlertCenter`](crate::state::AlertCenter) as notification sink, and
//! serializes the result.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::commands;
use crate::commands::inventory::InventoryOverview;
use crate::commands::sale::{SaleRequest, SalesList};
use crate::error::ApiResult;
use crate::state::{bearer_token, ActiveAlert, AppState, AuthSession};
use stocksence_core::catalog::{ProductQuery, SalesQuery};
use stocksence_core::reporting::{Dashboard, SalesReport};
use stocksence_core::{NewProduct, Product, ProductUpdate, SaleReceipt, TimeWindow, User};

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub user: Option<User>,
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    let session = state
        .sessions
        .sign_up(&request.email, &request.password, &request.full_name)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<Json<AuthSession>> {
    let session = state.sessions.sign_in(&request.email, &request.password).await?;
    Ok(Json(session))
}

pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<StatusCode> {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.sign_out(token).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<SessionResponse>> {
    let user = state.session_user(&headers).await?;
    Ok(Json(SessionResponse { user }))
}

// =============================================================================
// Products
// =============================================================================

pub async fn list_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let user = state.session_user(&headers).await?;
    let sink = state.alerts.for_user(user.as_ref());
    let products =
        commands::product::list_products(&state.db, user.as_ref(), &sink, &query).await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let user = state.session_user(&headers).await?;
    let sink = state.alerts.for_user(user.as_ref());
    let product =
        commands::product::get_product(&state.db, user.as_ref(), &sink, &id).await?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let user = state.session_user(&headers).await?;
    let sink = state.alerts.for_user(user.as_ref());
    let product =
        commands::product::create_product(&state.db, user.as_ref(), &sink, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<ProductUpdate>,
) -> ApiResult<Json<Product>> {
    let user = state.session_user(&headers).await?;
    let sink = state.alerts.for_user(user.as_ref());
    let product = commands::product::update_product(
        &state.db,
        user.as_ref(),
        &sink,
        &id,
        update,
    )
    .await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let user = state.session_user(&headers).await?;
    let sink = state.alerts.for_user(user.as_ref());
    commands::product::delete_product(&state.db, user.as_ref(), &sink, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Inventory
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

pub async fn inventory_overview(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Json<InventoryOverview>> {
    let user = state.session_user(&headers).await?;
    let sink = state.alerts.for_user(user.as_ref());
    let overview = commands::inventory::inventory_overview(
        &state.db,
        user.as_ref(),
        &sink,
        &query,
    )
    .await?;
    Ok(Json(overview))
}

pub async fn adjust_quantity(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<QuantityRequest>,
) -> ApiResult<Json<Product>> {
    let user = state.session_user(&headers).await?;
    let sink = state.alerts.for_user(user.as_ref());
    let product = commands::inventory::adjust_quantity(
        &state.db,
        user.as_ref(),
        &sink,
        &id,
        request.quantity,
    )
    .await?;
    Ok(Json(product))
}

// =============================================================================
// Sales
// =============================================================================

pub async fn list_sales(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SalesQuery>,
) -> ApiResult<Json<SalesList>> {
    let user = state.session_user(&headers).await?;
    let sink = state.alerts.for_user(user.as_ref());
    let list = commands::sale::list_sales(
        &state.db,
        user.as_ref(),
        &sink,
        &query,
        &state.report_tz,
    )
    .await?;
    Ok(Json(list))
}

pub async fn record_sale(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SaleRequest>,
) -> ApiResult<(StatusCode, Json<SaleReceipt>)> {
    let user = state.session_user(&headers).await?;
    let sink = state.alerts.for_user(user.as_ref());
    let receipt = commands::sale::record_sale(&state.db, user.as_ref(), &sink, request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// `text/csv` attachment, or `204 No Content` when no sale matches.
pub async fn export_sales_csv(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SalesQuery>,
) -> ApiResult<Response> {
    let user = state.session_user(&headers).await?;
    let sink = state.alerts.for_user(user.as_ref());
    let today = state.local_now().date_naive();
    let export = commands::sale::export_sales_csv(
        &state.db,
        user.as_ref(),
        &sink,
        &query,
        &state.report_tz,
        today,
    )
    .await?;

    let Some(csv) = export else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", csv.file_name),
            ),
        ],
        csv.content,
    )
        .into_response())
}

// =============================================================================
// Dashboard, Reports, Alerts
// =============================================================================

pub async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Dashboard>> {
    let user = state.session_user(&headers).await?;
    let sink = state.alerts.for_user(user.as_ref());
    let board = commands::dashboard::dashboard(&state.db, user.as_ref(), &sink).await?;
    Ok(Json(board))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportParams {
    #[serde(default)]
    pub window: Option<String>,
}

pub async fn sales_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> ApiResult<Json<SalesReport>> {
    let user = state.session_user(&headers).await?;
    let sink = state.alerts.for_user(user.as_ref());
    let window = match params.window.as_deref() {
        Some(raw) => raw.parse::<TimeWindow>()?,
        None => TimeWindow::default(),
    };

    let report = commands::report::sales_report(
        &state.db,
        user.as_ref(),
        &sink,
        window,
        state.local_now(),
    )
    .await?;
    Ok(Json(report))
}

/// The caller's unexpired alerts.
pub async fn alerts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<ActiveAlert>>> {
    let user = state.session_user(&headers).await?;
    let user = commands::require_session(user.as_ref())?;
    Ok(Json(state.alerts.active_for(&user.id)))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.db.health_check().await;
    debug!(database, "Health check");

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = json!({
        "status": if database { "ok" } else { "degraded" },
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
    });
    (status, Json(body))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::fixtures::app_state;
    use axum::http::HeaderValue;

    async fn signed_in(state: &AppState) -> HeaderMap {
        let request = SignUpRequest {
            email: "ada@shop.io".to_string(),
            password: "hunter22".to_string(),
            full_name: "Ada Lovelace".to_string(),
        };
        let (status, Json(session)) = sign_up(State(state.clone()), Json(request)).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", session.access_token);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
        headers
    }

    fn lamp(quantity: i64) -> NewProduct {
        NewProduct {
            name: "Desk Lamp".to_string(),
            description: "LED".to_string(),
            price_cents: 1000,
            cost_cents: 400,
            quantity,
            min_quantity: 5,
            category: "Home Goods".to_string(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_writes_without_token_are_401() {
        let state = app_state().await;

        let err = create_product(State(state.clone()), HeaderMap::new(), Json(lamp(3)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(state.db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_alerts_require_session_and_are_per_user() {
        let state = app_state().await;
        let headers = signed_in(&state).await;
        create_product(State(state.clone()), headers.clone(), Json(lamp(3)))
            .await
            .unwrap();

        let err = alerts(State(state.clone()), HeaderMap::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);

        let Json(own) = alerts(State(state.clone()), headers).await.unwrap();
        let messages: Vec<_> = own.iter().map(|a| a.alert.message.as_str()).collect();
        assert_eq!(messages, vec!["Product added successfully"]);

        let request = SignUpRequest {
            email: "bob@shop.io".to_string(),
            password: "hunter22".to_string(),
            full_name: "Bob".to_string(),
        };
        let (_, Json(bob)) = sign_up(State(state.clone()), Json(request)).await.unwrap();
        let mut bob_headers = HeaderMap::new();
        let value = format!("Bearer {}", bob.access_token);
        bob_headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());

        let Json(others) = alerts(State(state), bob_headers).await.unwrap();
        assert!(others.is_empty());
    }

    #[tokio::test]
    async fn test_session_endpoints() {
        let state = app_state().await;
        let headers = signed_in(&state).await;

        let Json(session) = current_session(State(state.clone()), headers.clone()).await.unwrap();
        assert_eq!(session.user.map(|u| u.full_name), Some("Ada Lovelace".to_string()));

        let status = sign_out(State(state.clone()), headers.clone()).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(session) = current_session(State(state.clone()), headers).await.unwrap();
        assert!(session.user.is_none());

        let request = SignInRequest {
            email: "ada@shop.io".to_string(),
            password: "wrong-pass".to_string(),
        };
        let err = sign_in(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_product_and_sale_flow() {
        let state = app_state().await;
        let headers = signed_in(&state).await;

        let (status, Json(product)) =
            create_product(State(state.clone()), headers.clone(), Json(lamp(20)))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let sale = SaleRequest {
            product_id: product.id.clone(),
            quantity: 20,
        };
        let (_, Json(receipt)) = record_sale(State(state.clone()), headers.clone(), Json(sale))
            .await
            .unwrap();
        assert_eq!(receipt.remaining_quantity, 0);
        assert_eq!(receipt.sale.total_price_cents, 20_000);

        let Json(fetched) = get_product(State(state.clone()), headers.clone(), Path(product.id.clone()))
            .await
            .unwrap();
        assert!(fetched.is_out_of_stock());

        let sale = SaleRequest {
            product_id: product.id.clone(),
            quantity: 1,
        };
        let err = record_sale(State(state.clone()), headers.clone(), Json(sale))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

        let Json(active) = alerts(State(state.clone()), headers.clone()).await.unwrap();
        let messages: Vec<_> = active.iter().map(|a| a.alert.message.as_str()).collect();
        assert!(messages.contains(&"Sale recorded successfully"));
        assert!(messages.contains(&"Desk Lamp is out of stock"));
    }

    #[tokio::test]
    async fn test_adjust_quantity_endpoint() {
        let state = app_state().await;
        let headers = signed_in(&state).await;
        let (_, Json(product)) = create_product(State(state.clone()), headers.clone(), Json(lamp(20)))
            .await
            .unwrap();

        let Json(adjusted) = adjust_quantity(
            State(state.clone()),
            headers.clone(),
            Path(product.id.clone()),
            Json(QuantityRequest { quantity: 8 }),
        )
        .await
        .unwrap();
        assert_eq!(adjusted.quantity, 8);

        let err = adjust_quantity(
            State(state.clone()),
            headers.clone(),
            Path(product.id.clone()),
            Json(QuantityRequest { quantity: -1 }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let Json(overview) = inventory_overview(State(state), headers, Query(ProductQuery::default()))
            .await
            .unwrap();
        assert_eq!(overview.summary.total_units, 8);
    }

    #[tokio::test]
    async fn test_delete_then_404() {
        let state = app_state().await;
        let headers = signed_in(&state).await;
        let (_, Json(product)) = create_product(State(state.clone()), headers.clone(), Json(lamp(2)))
            .await
            .unwrap();

        let status = delete_product(State(state.clone()), headers.clone(), Path(product.id.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = get_product(State(state), headers, Path(product.id)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_csv_export() {
        let state = app_state().await;
        let headers = signed_in(&state).await;

        let resp = export_sales_csv(State(state.clone()), headers.clone(), Query(SalesQuery::default()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let (_, Json(product)) = create_product(State(state.clone()), headers.clone(), Json(lamp(5)))
            .await
            .unwrap();
        let sale = SaleRequest {
            product_id: product.id,
            quantity: 2,
        };
        record_sale(State(state.clone()), headers.clone(), Json(sale)).await.unwrap();

        let resp = export_sales_csv(State(state), headers, Query(SalesQuery::default()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv; charset=utf-8"
        );
        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
        assert!(disposition.to_str().unwrap().contains("sales_report_"));

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.starts_with("Product,Quantity,Total Price,Date\n\"Desk Lamp\",2,20.00,"));
    }

    #[tokio::test]
    async fn test_report_window_parsing() {
        let state = app_state().await;
        let headers = signed_in(&state).await;

        let params = ReportParams {
            window: Some("THISWEEK".to_string()),
        };
        let Json(report) = sales_report(State(state.clone()), headers.clone(), Query(params))
            .await
            .unwrap();
        assert_eq!(report.window, TimeWindow::ThisWeek);

        let Json(report) = sales_report(State(state.clone()), headers.clone(), Query(ReportParams::default()))
            .await
            .unwrap();
        assert_eq!(report.window, TimeWindow::ThisMonth);

        let params = ReportParams {
            window: Some("fortnight".to_string()),
        };
        let err = sales_report(State(state), headers, Query(params)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_dashboard_and_health() {
        let state = app_state().await;
        let headers = signed_in(&state).await;

        let Json(board) = dashboard(State(state.clone()), headers).await.unwrap();
        assert_eq!(board.stats.total_products, 0);

        let resp = health(State(state.clone())).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        state.db.close().await;
        let resp = health(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

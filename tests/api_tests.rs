use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use travel_manager::config::EnvironmentConfig;
use travel_manager::{create_app_router, AppState};

const ADMIN_KEY: &str = "test-admin-key";

struct TestApp {
    router: Router,
    _dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = EnvironmentConfig {
            data_dir: dir.path().to_path_buf(),
            admin_api_key: Some(ADMIN_KEY.to_string()),
            ..EnvironmentConfig::default()
        };
        let state = AppState::from_config(config).await.unwrap();

        Self {
            router: create_app_router(state),
            _dir: dir,
        }
    }

    async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        api_key: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = api_key {
            builder = builder.header("x-api-key", key);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body), None).await
    }

    async fn patch(&self, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request("PATCH", uri, body, None).await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request("DELETE", uri, None, None).await
    }

    /// Crear un registro y devolver su id
    async fn create(&self, uri: &str, body: Value) -> u64 {
        let (status, response) = self.post(uri, body).await;
        assert_eq!(status, StatusCode::CREATED, "POST {} -> {}", uri, response);
        response["data"]["id"].as_u64().unwrap()
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_ids_are_never_reused() {
    let app = TestApp::new().await;

    assert_eq!(app.create("/customers", json!({ "name": "Ana" })).await, 1);
    assert_eq!(app.create("/customers", json!({ "name": "Bruno" })).await, 2);

    let (status, body) = app.delete("/customers/2?hard=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["mode"], "hard");

    assert_eq!(app.create("/customers", json!({ "name": "Carla" })).await, 3);
}

#[tokio::test]
async fn test_soft_delete_hides_record_from_listing() {
    let app = TestApp::new().await;
    app.create("/customers", json!({ "name": "Ana" })).await;
    app.create("/customers", json!({ "name": "Bruno" })).await;

    let (status, body) = app.delete("/customers/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["mode"], "soft");
    assert_eq!(body["data"]["changed"], true);

    let (_, body) = app.get("/customers").await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Bruno");
    assert_eq!(body["metadata"]["total_count"], 2);

    let (_, body) = app.get("/customers?include_inactive=true").await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["status"], "inactive");

    // repetir el borrado lógico no es un error
    let (status, body) = app.delete("/customers/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["changed"], false);

    let (status, body) = app.get("/customers/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "inactive");
}

#[tokio::test]
async fn test_reactivate_requires_inactive_record() {
    let app = TestApp::new().await;
    app.create("/destinations", json!({ "name": "Lisboa", "country": "PT", "price": 250.0 }))
        .await;

    let (status, body) = app.post("/destinations/1/reactivate", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    app.delete("/destinations/1").await;
    let (status, body) = app.post("/destinations/1/reactivate", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "active");
}

#[tokio::test]
async fn test_customer_hard_delete_cascades() {
    let app = TestApp::new().await;
    let customer = app.create("/customers", json!({ "name": "A" })).await;
    assert_eq!(customer, 1);
    app.create("/destinations", json!({ "name": "Oporto", "country": "PT", "price": 90.0 }))
        .await;

    let booking = app
        .create("/bookings", json!({ "customer_id": 1, "destination_id": 1 }))
        .await;
    app.create(
        "/payments",
        json!({ "booking_id": booking, "method": "paypal", "amount": 90.0 }),
    )
    .await;
    app.create(
        "/feedback",
        json!({ "customer_id": 1, "type": "suggestion", "message": "More trains please" }),
    )
    .await;

    let (status, body) = app.delete("/customers/1?hard=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cascade"]["deleted"]["bookings"], json!([1]));

    assert_eq!(app.get("/bookings/1").await.0, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/payments/1").await.0, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/feedback/1").await.0, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/customers/1").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_references_are_validated() {
    let app = TestApp::new().await;
    app.create("/customers", json!({ "name": "A" })).await;

    let (status, body) = app
        .post("/bookings", json!({ "customer_id": 1, "destination_id": 42 }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["details"]["destination_id"].is_array());
}

#[tokio::test]
async fn test_schedule_overlap_is_rejected() {
    let app = TestApp::new().await;
    app.create("/vehicles", json!({ "type": "minibus", "capacity": 20 })).await;

    app.create(
        "/schedules",
        json!({
            "vehicle_id": 1,
            "starts_at": "2024-06-01T10:00:00Z",
            "ends_at": "2024-06-01T11:00:00Z"
        }),
    )
    .await;

    let (status, body) = app
        .post(
            "/schedules",
            json!({
                "vehicle_id": 1,
                "starts_at": "2024-06-01T10:30:00Z",
                "ends_at": "2024-06-01T11:30:00Z"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let id = app
        .create(
            "/schedules",
            json!({
                "vehicle_id": 1,
                "starts_at": "2024-06-01T11:00:00Z",
                "ends_at": "2024-06-01T12:00:00Z"
            }),
        )
        .await;
    let (_, body) = app.get(&format!("/schedules/{}", id)).await;
    assert_eq!(body["capacity"], 20);
}

#[tokio::test]
async fn test_payment_confirmation_and_refunds() {
    let app = TestApp::new().await;
    app.create("/customers", json!({ "name": "A" })).await;
    app.create("/destinations", json!({ "name": "Madeira", "country": "PT", "price": 100.0 }))
        .await;
    let booking = app
        .create(
            "/bookings",
            json!({ "customer_id": 1, "destination_id": 1, "travelers": 2 }),
        )
        .await;

    let (_, body) = app.get(&format!("/bookings/{}", booking)).await;
    assert_eq!(body["total_amount"], 200.0);

    let short = app
        .create(
            "/payments",
            json!({ "booking_id": booking, "method": "credit_card", "amount": 150.0 }),
        )
        .await;
    let (status, body) = app.patch(&format!("/payments/{}/confirm", short), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["details"]["amount"].is_array());

    let charge = app
        .create(
            "/payments",
            json!({ "booking_id": booking, "method": "credit_card", "amount": 200.0 }),
        )
        .await;
    let (status, body) = app.patch(&format!("/payments/{}/confirm", charge), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["payment_status"], "confirmed");

    let (status, _) = app.patch(&format!("/payments/{}/confirm", charge), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(&format!("/payments/{}/refund", charge), json!({ "amount": 50.0 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["remaining_refundable"], 150.0);
    assert_eq!(body["data"]["refund"]["kind"], "refund");
    assert_eq!(body["data"]["charge"]["payment_status"], "confirmed");

    let (status, _) = app
        .post(&format!("/payments/{}/refund", charge), json!({ "amount": 500.0 }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app
        .request("POST", &format!("/payments/{}/refund", charge), None, None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["refund"]["amount"], 150.0);
    assert_eq!(body["data"]["charge"]["payment_status"], "refunded");

    let (_, body) = app.get(&format!("/bookings/{}/summary", booking)).await;
    assert_eq!(body["amount_paid"], 0.0);
    assert_eq!(body["balance_due"], 200.0);
}

#[tokio::test]
async fn test_guide_requires_destination() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/staff",
            json!({ "name": "Lucía", "role": "Tour Guide", "contact_email": "lucia@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["details"]["destination_ids"].is_array());

    app.create("/destinations", json!({ "name": "Sintra", "country": "PT", "price": 40.0 }))
        .await;
    app.create(
        "/staff",
        json!({
            "name": "Lucía",
            "role": "Tour Guide",
            "contact_email": "lucia@example.com",
            "destination_ids": [1]
        }),
    )
    .await;

    let (status, _) = app
        .post(
            "/staff",
            json!({ "name": "Otra", "role": "Driver", "contact_email": "LUCIA@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app.get("/staff/assigned-to/1").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_feedback_admin_endpoints_require_key() {
    let app = TestApp::new().await;
    app.create("/customers", json!({ "name": "A" })).await;

    let import = json!({
        "items": [
            { "customer_id": 1, "type": "complaint", "message": "Late pickup" },
            { "customer_id": 1, "type": "suggestion", "message": "Add Wi-Fi", "feedback_status": "resolved" }
        ]
    });

    let (status, _) = app.post("/feedback/import", import.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request("POST", "/feedback/import", Some(import.clone()), Some("wrong"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .request("POST", "/feedback/import", Some(import), Some(ADMIN_KEY))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = app.get("/feedback/summary").await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["resolution_rate"], 50.0);

    app.delete("/feedback/1").await;
    let (status, _) = app
        .patch("/feedback/1", Some(json!({ "message": "Updated" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request("DELETE", "/feedback/purge", None, Some(ADMIN_KEY))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["purged_ids"], json!([1]));
    assert_eq!(body["remaining_count"], 1);
}

#[tokio::test]
async fn test_feedback_field_projection() {
    let app = TestApp::new().await;
    app.create("/customers", json!({ "name": "A" })).await;
    app.create(
        "/feedback",
        json!({ "customer_id": 1, "type": "complaint", "message": "Cold bus" }),
    )
    .await;

    let (status, body) = app.get("/feedback?fields=message").await;
    assert_eq!(status, StatusCode::OK);
    let item = body["items"][0].as_object().unwrap();
    assert_eq!(item.len(), 2);
    assert_eq!(item["message"], "Cold bus");
    assert_eq!(item["id"], 1);
}

#[tokio::test]
async fn test_vehicle_bulk_is_all_or_nothing() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/vehicles/bulk",
            json!({
                "vehicles": [
                    { "type": "bus", "capacity": 50, "license_plate": "AB-123-CD" },
                    { "type": "van", "capacity": 0 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["details"]["vehicles"].is_array());

    let (status, _) = app
        .post(
            "/vehicles/bulk",
            json!({
                "vehicles": [
                    { "type": "bus", "capacity": 50, "license_plate": "AB-123-CD" },
                    { "type": "van", "capacity": 8, "license_plate": "ab 123 cd" }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app.get("/vehicles").await;
    assert_eq!(body["metadata"]["total_count"], 0);

    let (status, body) = app
        .post(
            "/vehicles/bulk",
            json!({
                "vehicles": [
                    { "type": "bus", "capacity": 50, "license_plate": "AB-123-CD" },
                    { "type": "van", "capacity": 8 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"][0]["license_plate"], "AB123CD");
    assert_eq!(body["data"][1]["id"], 2);
}

#[tokio::test]
async fn test_invalid_list_parameters() {
    let app = TestApp::new().await;

    assert_eq!(app.get("/customers?limit=0").await.0, StatusCode::BAD_REQUEST);
    assert_eq!(app.get("/customers?limit=101").await.0, StatusCode::BAD_REQUEST);
    assert_eq!(
        app.get("/customers?sort_by=password").await.0,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.get("/customers?sort_order=sideways").await.0,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_offset_past_the_end_returns_empty_page() {
    let app = TestApp::new().await;
    app.create("/customers", json!({ "name": "Ana" })).await;

    let (status, body) = app.get("/customers?offset=18446744073709551615").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(body["metadata"]["has_more"], false);

    let (status, _) = app.get("/customers?offset=18446744073709551615&limit=1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_vehicle_update_keeps_schedules_consistent() {
    let app = TestApp::new().await;
    app.create("/destinations", json!({ "name": "Évora", "country": "PT", "price": 60.0 }))
        .await;
    app.create("/destinations", json!({ "name": "Braga", "country": "PT", "price": 55.0 }))
        .await;
    app.create(
        "/vehicles",
        json!({ "type": "minibus", "capacity": 20, "destination_ids": [1, 2] }),
    )
    .await;
    app.create(
        "/schedules",
        json!({
            "vehicle_id": 1,
            "destination_id": 1,
            "starts_at": "2024-06-01T10:00:00Z",
            "ends_at": "2024-06-01T11:00:00Z",
            "capacity": 20
        }),
    )
    .await;

    let (status, body) = app
        .request("PUT", "/vehicles/1", Some(json!({ "capacity": 5 })), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["details"]["capacity"].is_array());

    let (status, body) = app
        .request("PUT", "/vehicles/1", Some(json!({ "destination_ids": [2] })), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["details"]["destination_ids"].is_array());

    let (_, body) = app.get("/vehicles/1").await;
    assert_eq!(body["capacity"], 20);
    assert_eq!(body["destination_ids"], json!([1, 2]));

    // una salida desactivada ya no bloquea el cambio
    app.delete("/schedules/1").await;
    let (status, body) = app
        .request("PUT", "/vehicles/1", Some(json!({ "capacity": 5 })), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["capacity"], 5);
}

#[tokio::test]
async fn test_payment_amount_range_must_be_ordered() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/payments?min_amount=100&max_amount=50").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/payments?min_amount=50&max_amount=100").await;
    assert_eq!(status, StatusCode::OK);
}

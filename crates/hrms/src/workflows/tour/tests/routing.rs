use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::workflows::tour::tour_router;

async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serialise body")))
        .expect("request builds")
}

#[tokio::test]
async fn apply_route_returns_created_tour() {
    let harness = build_service();
    let router = tour_router(harness.service.clone());

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/tours",
            &json!({
                "applied_by": "emp-john",
                "from_destination": "Pune",
                "to_destination": "Bengaluru",
                "start_date": "2099-01-05",
                "end_date": "2099-01-06",
                "approval_type": "post",
            }),
        ))
        .await
        .expect("apply route");
    assert_eq!(response.status(), StatusCode::CREATED);
    let tour = read_json_body(response).await;
    assert_eq!(tour["status"], "pending");
    assert_eq!(tour["short_code"], "T");
    let id = tour["id"].as_str().expect("tour id").to_string();

    let status = router
        .oneshot(
            Request::get(format!("/api/v1/tours/{id}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("status route");
    assert_eq!(status.status(), StatusCode::OK);
    let body = read_json_body(status).await;
    assert_eq!(body["total_minutes"], 2 * 24 * 60);
    assert_eq!(body["history"][0]["action"], "applied");
}

#[tokio::test]
async fn action_route_maps_errors() {
    let harness = build_service();
    let tour = harness
        .service
        .apply(mumbai_trip(), at(6, 2, 10, 0))
        .expect("accepted");
    let router = tour_router(harness.service.clone());
    let uri = format!("/api/v1/tours/{}/actions", tour.id.0);

    let forbidden = router
        .clone()
        .oneshot(post_json(&uri, &json!({ "action": "approve", "actor": "emp-asha" })))
        .await
        .expect("action route");
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let missing_end = router
        .clone()
        .oneshot(post_json(&uri, &json!({ "action": "extend", "actor": "emp-asha" })))
        .await
        .expect("action route");
    assert_eq!(missing_end.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let extended = router
        .clone()
        .oneshot(post_json(
            &uri,
            &json!({
                "action": "extend",
                "actor": "emp-asha",
                "comments": "stay on",
                "new_end": "2025-06-06T18:00:00",
            }),
        ))
        .await
        .expect("action route");
    assert_eq!(extended.status(), StatusCode::OK);
    assert_eq!(read_json_body(extended).await["status"], "extended");

    let unknown = router
        .oneshot(post_json(
            "/api/v1/tours/tour-missing/actions",
            &json!({ "action": "approve", "actor": "emp-ravi" }),
        ))
        .await
        .expect("action route");
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

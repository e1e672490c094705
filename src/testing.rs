//! Prism - In-process fake analytics backend for tests

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use crate::api::{ChatRequest, VisualizeRequest};

/// Start the fake backend on an ephemeral port and return its base URL.
pub async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/chat", post(chat))
        .route("/api/visualize", post(visualize))
        .route("/api/report/{dataset_id}", post(report));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{}", addr)
}

async fn chat(Json(req): Json<ChatRequest>) -> Json<Value> {
    match req.question.as_str() {
        "silent" => return Json(json!({})),
        "zero" => return Json(json!({ "answer": 0 })),
        "false" => return Json(json!({ "answer": false })),
        "blank" => return Json(json!({ "answer": "" })),
        "count" => return Json(json!({ "answer": 42 })),
        _ => {}
    }
    Json(json!({ "answer": format!("{}: {}", req.dataset_id, req.question) }))
}

async fn visualize(Json(req): Json<VisualizeRequest>) -> Json<Value> {
    Json(json!({
        "spec": {
            "mark": req.chart_type,
            "encoding": {
                "x": { "field": req.x },
                "y": { "field": req.y },
            }
        }
    }))
}

async fn report(Path(dataset_id): Path<String>) -> impl IntoResponse {
    if dataset_id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "unknown dataset" })));
    }
    (
        StatusCode::OK,
        Json(json!({ "markdown": format!("# Report for {}", dataset_id) })),
    )
}

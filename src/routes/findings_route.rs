use actix_web::{get, web, HttpResponse};
use serde_json::json;

use crate::services::LatestScan;

#[get("/latest")]
async fn latest_findings(latest: web::Data<LatestScan>) -> HttpResponse {
    match latest.snapshot().await {
        Some(report) => HttpResponse::Ok().json(report),
        None => HttpResponse::NotFound().json(json!({ "error": "No scan has completed yet" })),
    }
}

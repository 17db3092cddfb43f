use std::time::Duration;

use actix_web::http::header::CONTENT_TYPE;
use actix_web::{web, HttpResponse};
use log::{debug, error, info, warn};
use serde::Deserialize;

use crate::interfaces::subconverter::merge_and_convert;
use crate::models::SubconverterTarget;
use crate::settings::Settings;
use crate::utils::http::{web_get_async, FetchError, FetchOptions};

/// Query parameters for subscription conversion
#[derive(Deserialize, Debug, Default, Clone)]
pub struct SubconverterQuery {
    /// URLs to convert (pipe separated)
    pub url: Option<String>,
    /// Target format, the configured default when absent
    pub target: Option<String>,
}

fn fetch_options(settings: &Settings) -> FetchOptions {
    FetchOptions {
        timeout: Duration::from_secs(settings.fetch_timeout_secs),
        max_size: settings.max_download_size,
    }
}

/// Handler for subscription conversion
///
/// The target is validated before anything is fetched. Transport failures
/// answer 502, conversion failures 400.
pub async fn sub_handler(
    query: web::Query<SubconverterQuery>,
    settings: web::Data<Settings>,
) -> HttpResponse {
    let urls: Vec<&str> = match query.url.as_deref() {
        Some(url) => url
            .split('|')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .collect(),
        None => Vec::new(),
    };
    if urls.is_empty() {
        return HttpResponse::BadRequest().body("Missing url parameter.");
    }

    let target_name = query
        .target
        .as_deref()
        .filter(|target| !target.trim().is_empty())
        .unwrap_or(settings.default_target.as_str())
        .trim()
        .to_lowercase();
    let target: SubconverterTarget = match target_name.parse() {
        Ok(target) => target,
        Err(e) => {
            debug!("Rejecting request for target {}", target_name);
            return HttpResponse::BadRequest().body(e.to_string());
        }
    };

    let options = fetch_options(&settings);
    let mut bodies = Vec::with_capacity(urls.len());
    for url in &urls {
        match web_get_async(url, &options).await {
            Ok(body) => bodies.push(body),
            Err(FetchError::Status(status)) => {
                warn!("Subscription {} answered {}", url, status);
                return HttpResponse::BadGateway()
                    .body(format!("Failed to fetch subscription: {}", status.as_u16()));
            }
            Err(e) => {
                warn!("Failed to fetch subscription {}: {}", url, e);
                return HttpResponse::BadGateway().body("Failed to fetch subscription.");
            }
        }
    }
    info!("Fetched {} subscriptions for target {}", bodies.len(), target);

    let overrides = &settings.overrides;
    match merge_and_convert(bodies.as_slice(), target.as_str(), overrides) {
        Ok(result) => HttpResponse::Ok()
            .insert_header((CONTENT_TYPE, target.content_type(overrides.output_json)))
            .body(result),
        Err(e) => {
            error!("Conversion failed ({}): {}", e.kind(), e);
            HttpResponse::BadRequest().body(format!("Conversion failed: {}", e))
        }
    }
}

/// Health check
pub async fn health_handler() -> HttpResponse {
    HttpResponse::Ok().body("subconvert is running!")
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health_handler))
        .route("/sub", web::get().to(sub_handler));
}

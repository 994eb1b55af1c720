use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;
use crate::models::{ErrorResponse, HealthResponse, ListingsQuery, ListingsResponse, RefreshResponse};
use crate::services::{refresh as refresh_store, SharedStore, StoreStatus, ViewStateCoordinator};
use std::time::Duration;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub base_path: String,
    pub retry_delay: Duration,
}

/// Configure all listing-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/listings", web::get().to(list_profiles))
        .route("/listings/refresh", web::post().to(refresh))
        .route("/profiles/{id}", web::get().to(get_profile));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store = state.store.lock().await;
    let stale = store.is_stale();

    let status = match store.status() {
        StoreStatus::Ready => "healthy",
        StoreStatus::Loading => "loading",
        StoreStatus::Empty | StoreStatus::Stale => "degraded",
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        profiles: store.profiles().len(),
        stale,
        last_fetch: store.last_fetch(),
        durable_cache: store.cache().is_durable(),
        cached_entries: store.cache().entry_count(),
        timestamp: chrono::Utc::now(),
    })
}

/// Filtered listings endpoint
///
/// GET /api/v1/listings?userType=escort&specificService=massage&county=Nairobi&maxAge=30
///
/// Category and specific service are read back from the URL the same way a
/// shared link is; the remaining parameters are applied on top.
async fn list_profiles(
    state: web::Data<AppState>,
    query: web::Query<ListingsQuery>,
    req: HttpRequest,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for listings request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    if let Some(user_type) = query.unknown_user_type() {
        tracing::info!("Rejecting unknown userType: {}", user_type);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: format!("Unknown userType: {}", user_type),
            status_code: 400,
        });
    }

    let url = match req.uri().query() {
        Some(q) => format!("{}?{}", state.base_path, q),
        None => state.base_path.clone(),
    };

    let mut coordinator = ViewStateCoordinator::from_url(state.store.clone(), &url, state.retry_delay);
    coordinator.update_county(query.county.as_deref());
    let criteria = query.extra_criteria(coordinator.criteria().clone());
    coordinator.update_filters(criteria, false).await;

    let status = coordinator.mount().await;
    let error = state.store.lock().await.error().map(str::to_string);

    if status == StoreStatus::Empty {
        if let Some(message) = &error {
            tracing::error!("No profiles available: {}", message);
            return HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "Profiles unavailable".to_string(),
                message: message.clone(),
                status_code: 503,
            });
        }
    }

    let view = coordinator.render(&mut rand::rng());

    tracing::info!(
        "Returning {} profiles and {} spas for {}",
        view.profiles.len(),
        view.spas.len(),
        coordinator.url()
    );

    let tiers = query.group_by_tier.unwrap_or(false).then(|| coordinator.tiers());

    HttpResponse::Ok().json(ListingsResponse {
        profiles: view.profiles,
        spas: view.spas,
        total_count: view.total_count,
        has_active_filters: view.has_active_filters,
        url: coordinator.url().to_string(),
        tiers,
        error,
    })
}

/// Force a reload of the full collection
///
/// POST /api/v1/listings/refresh
async fn refresh(state: web::Data<AppState>) -> impl Responder {
    let success = refresh_store(&state.store).await;
    let store = state.store.lock().await;

    let response = RefreshResponse {
        success,
        total_count: store.profiles().len(),
        error: store.error().map(str::to_string),
    };

    if success {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::BadGateway().json(response)
    }
}

/// Profile detail endpoint
///
/// GET /api/v1/profiles/{id}
async fn get_profile(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    let store = state.store.lock().await;

    match store.profile(&id).await {
        Some(profile) => HttpResponse::Ok().json(profile),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: "Profile not found".to_string(),
            message: format!("No profile with id {}", id),
            status_code: 404,
        }),
    }
}

use crate::gui_bridge::catalog::{CatalogError, LayerCatalog};
use crate::gui_bridge::model::{ApiError, HotspotQuery, LayerQuery};
use anyhow::Context;
use chrono::NaiveDate;
use log::{error, info, warn};
use serde::Serialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn with_catalog(
    catalog: Arc<LayerCatalog>,
) -> impl Filter<Extract = (Arc<LayerCatalog>,), Error = Infallible> + Clone {
    warp::any().map(move || catalog.clone())
}

fn json_reply<T: Serialize>(body: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

fn catalog_failure(err: CatalogError) -> Response {
    let status = match err {
        CatalogError::InvalidName(_) | CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::Io { .. } | CatalogError::Decode { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        error!("catalog: {err}");
    } else {
        warn!("catalog: {err}");
    }
    json_reply(&ApiError::new(err.to_string()), status)
}

fn list_layers(catalog: Arc<LayerCatalog>) -> Response {
    match catalog.names() {
        Ok(names) => json_reply(&names, StatusCode::OK),
        Err(err) => catalog_failure(err),
    }
}

fn layer_data(query: LayerQuery, catalog: Arc<LayerCatalog>) -> Response {
    match catalog.load(&query.name) {
        Ok(collection) => json_reply(&collection, StatusCode::OK),
        Err(err) => catalog_failure(err),
    }
}

fn hotspots(query: HotspotQuery, catalog: Arc<LayerCatalog>) -> Response {
    let date = query.date();
    if let Some(date) = date {
        if NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
            warn!("hotspots: rejected date {date:?}");
            return json_reply(
                &ApiError::new(format!("date must be YYYY-MM-DD, got {date:?}")),
                StatusCode::BAD_REQUEST,
            );
        }
    }
    match catalog.hotspots(date) {
        Ok(collection) => {
            info!(
                "hotspots {}: {} features",
                date.unwrap_or("all dates"),
                collection.len()
            );
            json_reply(&collection, StatusCode::OK)
        }
        Err(err) => catalog_failure(err),
    }
}

/// `GET /layers`, `GET /layer_data?name=` and `GET /hotspots?date=`.
pub fn routes(
    catalog: Arc<LayerCatalog>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let layers = warp::path("layers")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_catalog(catalog.clone()))
        .map(list_layers);

    let data = warp::path("layer_data")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<LayerQuery>())
        .and(with_catalog(catalog.clone()))
        .map(layer_data);

    let hotspot_route = warp::path("hotspots")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<HotspotQuery>())
        .and(with_catalog(catalog))
        .map(hotspots);

    layers
        .or(data)
        .unify()
        .or(hotspot_route)
        .unify()
        .with(warp::log("firms_server::http"))
}

/// Serves the catalog on `addr` until Ctrl+C.
pub async fn serve(catalog: Arc<LayerCatalog>, addr: SocketAddr) -> anyhow::Result<()> {
    let data_dir = catalog.data_dir().display().to_string();
    let (bound, server) = warp::serve(routes(catalog))
        .try_bind_with_graceful_shutdown(addr, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!("waiting for Ctrl+C: {err}");
            }
        })
        .with_context(|| format!("binding layer API to {addr}"))?;
    info!("serving layers from {data_dir} on http://{bound} (Ctrl+C to stop)");
    server.await;
    info!("layer API stopped");
    Ok(())
}

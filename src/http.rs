//! HTTP routes for the tour service.
//!
//! * `POST /tours` creates a tour, answering `201` with the new id;
//! * `GET /tours/{id}` returns one tour or `404`;
//! * `GET /tours?...` searches by the criteria in [`crate::criteria`].

use actix_web::error::{BlockingError, InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use serde_json::Value;
use tracing::{error, info};

use crate::criteria::QueryParams;
use crate::error::TourError;
use crate::models::TourId;
use crate::representation::TourRepresentation;
use crate::repository::TourRepository;
use crate::service::TourService;

pub const BODY_TOO_LARGE: &str = "Request body too large. (> 1 M)";

impl ResponseError for TourError {
    fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_string())
    }
}

/// Registers the routes on an app whose data holds a `TourService<R>`.
pub fn configure<R>(max_body_bytes: usize) -> impl FnOnce(&mut web::ServiceConfig)
where
    R: TourRepository + 'static,
{
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(
            web::JsonConfig::default()
                .limit(max_body_bytes)
                .error_handler(json_error),
        )
        .service(
            web::resource("/tours")
                .route(web::post().to(create_tour::<R>))
                .route(web::get().to(tours_by_criteria::<R>)),
        )
        .service(web::resource("/tours/{id}").route(web::get().to(get_tour::<R>)));
    }
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            BODY_TOO_LARGE.to_string()
        }
        other => other.to_string(),
    };
    info!("Error parsing JSON request: {}", message);
    InternalError::from_response(err, HttpResponse::BadRequest().json(message)).into()
}

/// Runs blocking store work off the async executor.
async fn blocking<T, F>(work: F) -> Result<T, actix_web::Error>
where
    F: FnOnce() -> Result<T, TourError> + Send + 'static,
    T: Send + 'static,
{
    let result = web::block(work).await.map_err(|err: BlockingError| {
        error!("Blocking task failed: {}", err);
        actix_web::error::ErrorInternalServerError(err)
    })?;
    result.map_err(|err| {
        if err.is_client_error() {
            info!("Rejected request: {}", err);
        } else {
            error!("Store failure: {}", err);
        }
        err.into()
    })
}

async fn create_tour<R>(
    service: web::Data<TourService<R>>,
    body: web::Json<Value>,
) -> Result<HttpResponse, actix_web::Error>
where
    R: TourRepository + 'static,
{
    let service = service.get_ref().clone();
    let id = blocking(move || {
        let representation = TourRepresentation::from_json(body.into_inner())?;
        service.create_tour(&representation)
    })
    .await?;

    Ok(HttpResponse::Created().json(id))
}

async fn get_tour<R>(
    service: web::Data<TourService<R>>,
    id: web::Path<TourId>,
) -> Result<HttpResponse, actix_web::Error>
where
    R: TourRepository + 'static,
{
    let service = service.get_ref().clone();
    let id = id.into_inner();
    let tour = blocking(move || service.get_tour(id)).await?;

    Ok(match tour {
        Some(tour) => HttpResponse::Ok().json(tour),
        None => HttpResponse::NotFound().finish(),
    })
}

async fn tours_by_criteria<R>(
    service: web::Data<TourService<R>>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, actix_web::Error>
where
    R: TourRepository + 'static,
{
    let service = service.get_ref().clone();
    let params: QueryParams = query.into_inner().into_iter().collect();
    let tours = blocking(move || service.resolve_criteria(&params)).await?;

    Ok(HttpResponse::Ok().json(tours))
}

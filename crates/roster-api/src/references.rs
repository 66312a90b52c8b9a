//! Handlers for reference data: street types, the geographic chain, and
//! roles.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/addresses/street-types` | `[{"value","description"}]` |
//! | `GET`  | `/countries` | |
//! | `POST` | `/countries` | Returns 201 |
//! | `GET`  | `/countries/{id}/states` | 404 if the country is missing |
//! | `POST` | `/states` | Body carries `country.id` |
//! | `GET`  | `/states/{id}/cities` | 404 if the state is missing |
//! | `POST` | `/cities` | Body carries `state.id` |
//! | `GET`  | `/roles` | |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  address::StreetType,
  reference::{CityDto, CountryDto, RoleDto, StateDto},
  service,
  store::ReferenceStore,
};
use serde::Serialize;
use strum::IntoEnumIterator as _;

use crate::{
  actor::ApiState,
  error::{ApiError, Result},
};

fn store_error<E: Into<roster_core::Error>>(e: E) -> ApiError { ApiError(e.into()) }

// ─── Street types ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StreetTypeDto {
  pub value:       &'static str,
  pub description: &'static str,
}

/// `GET /addresses/street-types`
pub async fn street_types() -> Json<Vec<StreetTypeDto>> {
  let types = StreetType::iter()
    .map(|t| StreetTypeDto { value: t.as_str(), description: t.description() })
    .collect();
  Json(types)
}

// ─── Countries ────────────────────────────────────────────────────────────────

/// `GET /countries`
pub async fn countries<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<CountryDto>>>
where
  S: ReferenceStore + 'static,
{
  let countries = state.store.list_countries().await.map_err(store_error)?;
  Ok(Json(countries.iter().map(CountryDto::from).collect()))
}

/// `POST /countries`
pub async fn create_country<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<CountryDto>,
) -> Result<impl IntoResponse>
where
  S: ReferenceStore + 'static,
{
  let saved = service::create_country(state.store.as_ref(), body.into()).await?;
  Ok((StatusCode::CREATED, Json(CountryDto::from(&saved))))
}

// ─── States ───────────────────────────────────────────────────────────────────

/// `GET /countries/{id}/states`
pub async fn states<S>(
  State(state): State<ApiState<S>>,
  Path(country_id): Path<i64>,
) -> Result<Json<Vec<StateDto>>>
where
  S: ReferenceStore + 'static,
{
  let states = state.store.list_states(country_id).await.map_err(store_error)?;
  Ok(Json(states.iter().map(StateDto::from).collect()))
}

/// `POST /states`
pub async fn create_state<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<StateDto>,
) -> Result<impl IntoResponse>
where
  S: ReferenceStore + 'static,
{
  let saved = service::create_state(state.store.as_ref(), body.into()).await?;
  Ok((StatusCode::CREATED, Json(StateDto::from(&saved))))
}

// ─── Cities ───────────────────────────────────────────────────────────────────

/// `GET /states/{id}/cities`
pub async fn cities<S>(
  State(state): State<ApiState<S>>,
  Path(state_id): Path<i64>,
) -> Result<Json<Vec<CityDto>>>
where
  S: ReferenceStore + 'static,
{
  let cities = state.store.list_cities(state_id).await.map_err(store_error)?;
  Ok(Json(cities.iter().map(CityDto::from).collect()))
}

/// `POST /cities`
pub async fn create_city<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<CityDto>,
) -> Result<impl IntoResponse>
where
  S: ReferenceStore + 'static,
{
  let saved = service::create_city(state.store.as_ref(), body.into()).await?;
  Ok((StatusCode::CREATED, Json(CityDto::from(&saved))))
}

// ─── Roles ────────────────────────────────────────────────────────────────────

/// `GET /roles`
pub async fn roles<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<RoleDto>>>
where
  S: ReferenceStore + 'static,
{
  let roles = state.store.list_roles().await.map_err(store_error)?;
  Ok(Json(roles.iter().map(RoleDto::from).collect()))
}

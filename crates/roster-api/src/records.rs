//! Handlers shared by every record collection (`/people`, `/users`,
//! `/addresses`).
//!
//! | Method   | Path                | Notes |
//! |----------|---------------------|-------|
//! | `GET`    | `/{entity}/all`     | Every record, projected |
//! | `POST`   | `/{entity}/fetch`   | Body: [`FetchRequest`]; returns a page |
//! | `GET`    | `/{entity}/fetch/{name}` | Name search; paging from the query string |
//! | `GET`    | `/{entity}/{id}`    | 404 if not found |
//! | `POST`   | `/{entity}`         | Returns 201 + stored projection |
//! | `PUT`    | `/{entity}/{id}`    | Replaces the stored record |
//! | `DELETE` | `/{entity}/{id}`    | Returns `{"id": <id>}` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use roster_core::{
  Record,
  filter::{Filter, PageParams},
  page::Page,
  service,
  store::Repository,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
  actor::{ApiState, CurrentActor},
  error::Result,
};

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /{entity}/all`
pub async fn list<R, S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<R::Projection>>>
where
  R: Record,
  S: Repository<R> + 'static,
{
  Ok(Json(service::list::<R, S>(&state.store).await?))
}

/// A search body: the entity's filter fields and the paging fields side by
/// side in one JSON object.
#[derive(Debug, Deserialize)]
pub struct FetchRequest<F> {
  #[serde(flatten)]
  pub filter: F,
  #[serde(flatten)]
  pub page:   PageParams,
}

/// `POST /{entity}/fetch`
pub async fn fetch<R, S>(
  State(state): State<ApiState<S>>,
  Json(request): Json<FetchRequest<R::Filter>>,
) -> Result<Json<Page<R::Projection>>>
where
  R: Record,
  S: Repository<R> + 'static,
{
  let page = service::search::<R, S>(&state.store, &request.filter, &request.page).await?;
  Ok(Json(page))
}

/// `GET /{entity}/fetch/{name}`
pub async fn fetch_by_name<R, S>(
  State(state): State<ApiState<S>>,
  Path(name): Path<String>,
  Query(page): Query<PageParams>,
) -> Result<Json<Page<R::Projection>>>
where
  R: Record,
  S: Repository<R> + 'static,
{
  let filter = R::Filter::by_name(&name);
  Ok(Json(service::search::<R, S>(&state.store, &filter, &page).await?))
}

/// `GET /{entity}/{id}`
pub async fn get_one<R, S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<R::Projection>>
where
  R: Record,
  S: Repository<R> + 'static,
{
  let record = service::find::<R, S>(&state.store, id).await?;
  Ok(Json(R::Projection::from(&record)))
}

// ─── Writes ───────────────────────────────────────────────────────────────────

/// `POST /{entity}`
pub async fn create<R, S>(
  State(state): State<ApiState<S>>,
  CurrentActor(actor): CurrentActor,
  Json(body): Json<R::Projection>,
) -> Result<impl IntoResponse>
where
  R: Record,
  S: Repository<R> + 'static,
{
  let saved = service::create::<R, S>(&state.store, body.into(), &actor, Utc::now()).await?;
  Ok((StatusCode::CREATED, Json(R::Projection::from(&saved))))
}

/// `PUT /{entity}/{id}`
pub async fn update<R, S>(
  State(state): State<ApiState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<i64>,
  Json(body): Json<R::Projection>,
) -> Result<Json<R::Projection>>
where
  R: Record,
  S: Repository<R> + 'static,
{
  let saved = service::update::<R, S>(&state.store, id, body.into(), &actor, Utc::now()).await?;
  Ok(Json(R::Projection::from(&saved)))
}

/// `DELETE /{entity}/{id}`
pub async fn remove<R, S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Value>>
where
  R: Record,
  S: Repository<R> + 'static,
{
  service::delete::<R, S>(&state.store, id).await?;
  Ok(Json(json!({ "id": id })))
}

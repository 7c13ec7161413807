use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use colmena_types::api::{
    Claims, CreateHiveRequest, CreateHiveResponse, HiveResponse, HiveSummary, UpdateHiveRequest,
};
use colmena_types::catalog::{self, SensorDef};

use crate::auth::AppState;
use crate::authz::{self, Caller};
use crate::error::ApiError;
use crate::{parse_db_time, run_blocking};

/// The master sensor list, for the hive registration form.
pub async fn sensor_catalog() -> Json<&'static [SensorDef]> {
    Json(catalog::all())
}

pub async fn create_hive(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateHiveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let hive_code = req.hive_code.trim().to_string();
    if hive_code.is_empty() || req.sensors.is_empty() {
        return Err(ApiError::BadRequest(
            "hive code and sensor selection are required".to_string(),
        ));
    }

    let owner = claims.sub;
    let hive = run_blocking(move || {
        Ok(state
            .db
            .create_hive(&hive_code, req.description.as_deref(), &req.sensors, owner)?)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateHiveResponse {
            message: format!("Hive {} registered successfully.", hive.hive_code),
            hive: HiveSummary {
                id: hive.id,
                hive_code: hive.hive_code,
            },
        }),
    ))
}

pub async fn my_hives(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = claims.sub;
    let rows = run_blocking(move || Ok(state.db.hives_for_owner(owner)?)).await?;

    let hives: Vec<HiveResponse> = rows
        .into_iter()
        .map(|row| HiveResponse {
            id: row.id,
            hive_code: row.hive_code,
            description: row.description,
            created_at: parse_db_time(&row.created_at),
        })
        .collect();

    Ok(Json(hives))
}

pub async fn update_hive(
    State(state): State<AppState>,
    Path(hive_code): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateHiveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.sensors.is_empty() {
        return Err(ApiError::BadRequest(
            "sensor selection must not be empty".to_string(),
        ));
    }

    let caller = Caller::from(&claims);
    run_blocking(move || {
        let hive = state
            .db
            .find_hive_by_code(&hive_code)?
            .ok_or_else(|| ApiError::HiveNotFound(hive_code.clone()))?;
        if !authz::can_write(&caller, &hive) {
            return Err(ApiError::Forbidden);
        }
        state
            .db
            .update_hive(hive.id, req.description.as_deref(), &req.sensors)?;
        Ok(())
    })
    .await?;

    Ok(Json(json!({ "message": "Hive updated successfully." })))
}

pub async fn delete_hive(
    State(state): State<AppState>,
    Path(hive_code): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = Caller::from(&claims);
    run_blocking(move || {
        let hive = state
            .db
            .find_hive_by_code(&hive_code)?
            .ok_or_else(|| ApiError::HiveNotFound(hive_code.clone()))?;
        if !authz::can_write(&caller, &hive) {
            return Err(ApiError::Forbidden);
        }
        state.db.delete_hive(&hive.hive_code)?;
        Ok(())
    })
    .await?;

    Ok(Json(json!({ "message": "Hive deleted." })))
}

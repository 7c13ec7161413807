use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::json;

use colmena_types::api::{
    AdminDashboardResponse, AdminKpis, AdminUserView, Claims, ManagedHiveView, UpdateUserRequest,
};
use colmena_types::models::Role;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::{parse_db_time, run_blocking};

fn require_admin(claims: &Claims) -> Result<(), ApiError> {
    if claims.role.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AdminDashboardResponse>, ApiError> {
    require_admin(&claims)?;

    let (user_rows, hive_rows) = run_blocking(move || {
        let users = state.db.users_with_hive_counts()?;
        let hives = state.db.all_hives_with_owners()?;
        Ok((users, hives))
    })
    .await?;

    let users: Vec<AdminUserView> = user_rows
        .into_iter()
        .map(|row| AdminUserView {
            id: row.id,
            name: row.name,
            email: row.email,
            role: Role::parse(&row.role).unwrap_or(Role::Member),
            created_at: parse_db_time(&row.created_at),
            total_hives: row.total_hives,
        })
        .collect();

    let hives: Vec<ManagedHiveView> = hive_rows
        .into_iter()
        .map(|row| ManagedHiveView {
            id: row.id,
            hive_code: row.hive_code,
            description: row.description,
            created_at: parse_db_time(&row.created_at),
            owner_name: row.owner_name,
            owner_email: row.owner_email,
        })
        .collect();

    let total_users = users.len() as i64;
    let total_admins = users.iter().filter(|u| u.role.is_admin()).count() as i64;
    let kpis = AdminKpis {
        total_users,
        total_hives: hives.len() as i64,
        total_members: total_users - total_admins,
    };

    Ok(Json(AdminDashboardResponse { users, hives, kpis }))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&claims)?;

    let name = req.name.trim().to_string();
    let email = req.email.trim().to_string();
    if name.is_empty() || email.is_empty() {
        return Err(ApiError::BadRequest(
            "name and email are required".to_string(),
        ));
    }

    run_blocking(move || {
        state
            .db
            .update_user(user_id, &name, &email, req.role.as_str())?;
        Ok(())
    })
    .await?;

    Ok(Json(json!({ "message": "User updated successfully." })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_claims_are_rejected() {
        let claims = Claims { sub: 1, role: Role::Member, exp: 0 };
        assert!(matches!(require_admin(&claims), Err(ApiError::Forbidden)));
    }

    #[test]
    fn admin_claims_pass() {
        let claims = Claims { sub: 1, role: Role::Admin, exp: 0 };
        assert!(require_admin(&claims).is_ok());
    }
}

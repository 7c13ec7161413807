use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Role;

// -- JWT Claims --

/// JWT claims shared between token issuance (auth handlers) and the request
/// middleware. Canonical definition lives here to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserPublic,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserPublic,
}

#[derive(Debug, Serialize)]
pub struct UserPublic {
    pub id: i64,
    pub name: String,
    pub role: Role,
}

// -- Hives --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateHiveRequest {
    pub hive_code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub sensors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateHiveResponse {
    pub message: String,
    pub hive: HiveSummary,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateHiveRequest {
    #[serde(default)]
    pub description: Option<String>,
    pub sensors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HiveSummary {
    pub id: i64,
    pub hive_code: String,
}

#[derive(Debug, Serialize)]
pub struct HiveResponse {
    pub id: i64,
    pub hive_code: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// -- Sensor data --

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestPoint {
    pub value: f64,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub channel: String,
    pub value: f64,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HiveDataResponse {
    pub hive_code: String,
    pub active_sensors: Vec<String>,
    pub latest: HashMap<String, LatestPoint>,
    pub history: Vec<HistoryPoint>,
}

// -- Admin --

#[derive(Debug, Serialize)]
pub struct AdminUserView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub total_hives: i64,
}

#[derive(Debug, Serialize)]
pub struct ManagedHiveView {
    pub id: i64,
    pub hive_code: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub owner_name: String,
    pub owner_email: String,
}

#[derive(Debug, Serialize)]
pub struct AdminKpis {
    pub total_users: i64,
    pub total_hives: i64,
    pub total_members: i64,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboardResponse {
    pub users: Vec<AdminUserView>,
    pub hives: Vec<ManagedHiveView>,
    pub kpis: AdminKpis,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    pub role: Role,
}

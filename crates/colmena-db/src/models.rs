/// Database row types — these map directly to SQLite rows.
/// Distinct from the colmena-types API models to keep the DB layer
/// independent.

pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct HiveRow {
    pub id: i64,
    pub hive_code: String,
    pub description: Option<String>,
    pub user_id: i64,
    pub created_at: String,
}

pub struct UserWithHiveCount {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
    pub total_hives: i64,
}

pub struct ManagedHiveRow {
    pub id: i64,
    pub hive_code: String,
    pub description: Option<String>,
    pub created_at: String,
    pub owner_name: String,
    pub owner_email: String,
}

//! Hive access decisions.
//!
//! Pure predicates: admins touch everything, members only their own hives.
//! A `false` here never raises — the handler maps it to `Forbidden`.

use colmena_db::models::HiveRow;
use colmena_types::api::Claims;
use colmena_types::models::Role;

#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub id: i64,
    pub role: Role,
}

impl From<&Claims> for Caller {
    fn from(claims: &Claims) -> Self {
        Caller {
            id: claims.sub,
            role: claims.role,
        }
    }
}

pub fn can_read(caller: &Caller, hive: &HiveRow) -> bool {
    caller.role.is_admin() || hive.user_id == caller.id
}

pub fn can_write(caller: &Caller, hive: &HiveRow) -> bool {
    // Same rule as reads today; kept separate so the policies can diverge.
    can_read(caller, hive)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hive(owner: i64) -> HiveRow {
        HiveRow {
            id: 1,
            hive_code: "H1".to_string(),
            description: None,
            user_id: owner,
            created_at: "2024-05-01 10:00:00".to_string(),
        }
    }

    #[test]
    fn owner_can_read_and_write() {
        let caller = Caller { id: 5, role: Role::Member };
        assert!(can_read(&caller, &hive(5)));
        assert!(can_write(&caller, &hive(5)));
    }

    #[test]
    fn non_owner_member_is_denied() {
        let caller = Caller { id: 6, role: Role::Member };
        assert!(!can_read(&caller, &hive(5)));
        assert!(!can_write(&caller, &hive(5)));
    }

    #[test]
    fn admin_can_access_any_hive() {
        let caller = Caller { id: 99, role: Role::Admin };
        assert!(can_read(&caller, &hive(5)));
        assert!(can_write(&caller, &hive(5)));
    }
}

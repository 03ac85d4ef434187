use migration::entities::user;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

/// 当前请求者的能力
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub user_id: i32,
    pub is_admin: bool,
}

impl Permissions {
    pub fn of(user: &user::Model) -> Self {
        Self {
            user_id: user.id,
            is_admin: user.role == ROLE_ADMIN || user.is_superuser,
        }
    }

    /// 作者本人或管理员可修改/删除
    pub fn can_modify(&self, author_id: i32) -> bool {
        self.is_admin || self.user_id == author_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: i32, role: &str, is_superuser: bool) -> user::Model {
        user::Model {
            id,
            email: format!("u{}@example.com", id),
            username: format!("u{}", id),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: String::new(),
            role: role.to_string(),
            is_superuser,
            avatar: None,
            date_joined: Utc::now(),
            token_version: 0,
        }
    }

    #[test]
    fn test_author_can_modify_own_recipe_only() {
        let perms = Permissions::of(&user(1, ROLE_USER, false));
        assert!(!perms.is_admin);
        assert!(perms.can_modify(1));
        assert!(!perms.can_modify(2));
    }

    #[test]
    fn test_admin_role_or_superuser_can_modify_any() {
        assert!(Permissions::of(&user(1, ROLE_ADMIN, false)).can_modify(9));
        assert!(Permissions::of(&user(1, ROLE_USER, true)).can_modify(9));
    }
}

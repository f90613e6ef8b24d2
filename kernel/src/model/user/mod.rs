use crate::model::{
    id::{LibraryId, UserId},
    list::ListOptions,
    role::Role,
};
use chrono::{DateTime, Utc};

pub mod event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: UserId,
    pub external_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    // 管理者が運営する図書館（管理者でなければ None）
    pub library_id: Option<LibraryId>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    /// Super admins manage every library; an admin manages only the library
    /// attached to their account.
    pub fn can_manage(&self, library_id: LibraryId) -> bool {
        match self.role {
            Role::SuperAdmin => true,
            Role::Admin => self.library_id == Some(library_id),
            Role::Member => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct UserListOptions {
    pub role: Option<Role>,
    pub search: Option<String>,
    pub list: ListOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn user(role: Role, library_id: Option<LibraryId>) -> User {
        User {
            user_id: UserId::new(),
            external_id: "sub|1".into(),
            name: "Test User".into(),
            email: "test@example.com".into(),
            phone: None,
            role,
            library_id,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(Role::Member, true, false)]
    #[case(Role::Admin, true, true)]
    #[case(Role::Admin, false, false)]
    #[case(Role::SuperAdmin, false, true)]
    fn can_manage_by_role(#[case] role: Role, #[case] owns: bool, #[case] expected: bool) {
        let target = LibraryId::new();
        let library_id = if owns { Some(target) } else { Some(LibraryId::new()) };
        assert_eq!(user(role, library_id).can_manage(target), expected);
    }
}

use serde::{Deserialize, Serialize};

// --- User Role Definition ---

/// UserRole enum for authorization in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    Editor,
    Reader,
}

// --- Permission Enum Definition ---

/// Permission enum representing individual permissions in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    // User management
    ManageUsers,

    // News permissions. Reading is public and needs none.
    CreateNews,
    EditNews,
    DeleteNews,
    RestoreNews,

    // Course permissions
    ManageCourses,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Editor => "editor",
            UserRole::Reader => "reader",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "editor" => Some(UserRole::Editor),
            "reader" => Some(UserRole::Reader),
            _ => None,
        }
    }

    pub const ALL: [&'static str; 3] = ["admin", "editor", "reader"];

    /// Check if the user has a specific permission
    pub fn has_permission(&self, permission: Permission) -> bool {
        match self {
            UserRole::Admin => true,
            UserRole::Editor => match permission {
                Permission::CreateNews
                | Permission::EditNews
                | Permission::DeleteNews => true,

                // Undelete and course administration stay with admins
                Permission::RestoreNews
                | Permission::ManageCourses
                | Permission::ManageUsers => false,
            },
            // Signed in, but with nothing beyond what anonymous visitors get
            UserRole::Reader => false,
        }
    }
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageUsers => "manage_users",
            Permission::CreateNews => "create_news",
            Permission::EditNews => "edit_news",
            Permission::DeleteNews => "delete_news",
            Permission::RestoreNews => "restore_news",
            Permission::ManageCourses => "manage_courses",
        }
    }
}

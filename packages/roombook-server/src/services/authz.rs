use uuid::Uuid;

use crate::db::users::Model as UserModel;
use crate::error::AppError;

/// 已认证的调用者
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Principal {
    pub(crate) user_id: Uuid,
    pub(crate) email: String,
    pub(crate) name: String,
    pub(crate) is_admin: bool,
    pub(crate) is_superuser: bool,
}

impl Principal {
    pub(crate) fn is_privileged(&self) -> bool {
        self.is_admin || self.is_superuser
    }
}

impl From<&UserModel> for Principal {
    fn from(user: &UserModel) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            is_admin: user.is_admin,
            is_superuser: user.is_superuser,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Capability {
    /// Create bookings. Denied to administrators and superusers.
    Book,
    /// Create, update and delete rooms.
    ManageCatalog,
}

pub(crate) fn can(principal: &Principal, capability: Capability) -> bool {
    match capability {
        Capability::Book => !principal.is_privileged(),
        Capability::ManageCatalog => principal.is_privileged(),
    }
}

/// 权限检查的唯一入口, 不满足时返回 Forbidden
pub(crate) fn authorize(principal: &Principal, capability: Capability) -> Result<(), AppError> {
    if can(principal, capability) {
        return Ok(());
    }
    let message = match capability {
        Capability::Book => "Administrators cannot book rooms",
        Capability::ManageCatalog => "Administrator privileges required",
    };
    Err(AppError::Forbidden(message.to_string()))
}

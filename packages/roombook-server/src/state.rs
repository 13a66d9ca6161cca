use crate::bootstrap::config::AuthConfig;
use sea_orm::DatabaseConnection;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) db: DatabaseConnection,
    pub(crate) auth: AuthConfig,
}

//! API handlers for the Stacks REST endpoints

pub mod books;
pub mod health;
pub mod history;
pub mod openapi;
pub mod requests;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, models::user::Role, AppState};

/// Identity of the caller, as established by the authenticating gateway in
/// front of this server. Password verification and session handling happen
/// there; this server only consumes the resulting id and role headers.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: i32,
    pub role: Role,
}

impl CurrentUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role != Role::Admin {
            return Err(AppError::Authorization(
                "admin role required".to_string(),
            ));
        }
        Ok(())
    }
}

const USER_ID_HEADER: &str = "x-user-id";
const USER_ROLE_HEADER: &str = "x-user-role";

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i32>().ok())
            .ok_or_else(|| {
                AppError::Authentication(format!("Missing or invalid {} header", USER_ID_HEADER))
            })?;

        let role = match parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            Some("admin") => Role::Admin,
            Some("member") => Role::Member,
            _ => {
                return Err(AppError::Authentication(format!(
                    "Missing or invalid {} header",
                    USER_ROLE_HEADER
                )))
            }
        };

        Ok(CurrentUser { id, role })
    }
}

pub mod ap_classes;
pub mod authorized_users;
pub mod grade_levels;
pub mod prerequisites;
pub mod student_profiles;
pub mod subjects;
pub mod users;

pub use ap_classes::{ApClassFilter, ApClassService, NewApClass, UpdateApClass};
pub use authorized_users::AuthorizedUserService;
pub use grade_levels::GradeLevelService;
pub use prerequisites::{NewPreRequisite, PreRequisiteService, UpdatePreRequisite};
pub use student_profiles::{NewStudentProfile, StudentProfileService};
pub use subjects::SubjectService;
pub use users::{NewUser, UpdateUser, UserService};

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::error::ApiError;

/// Failures of a service operation
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("{0}")]
    NotFound(String),

    /// A name, email or id in the request points at nothing
    #[error("{0}")]
    UnknownReference(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(err.into())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => e.into(),
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::UnknownReference(msg) => ApiError::unprocessable_entity(msg),
            ServiceError::Forbidden(msg) => ApiError::forbidden(msg),
            ServiceError::Auth(e) => e.into(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

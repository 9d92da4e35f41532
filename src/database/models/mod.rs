pub mod authorized_user;
pub mod catalog;
pub mod student_profile;
pub mod user;

pub use authorized_user::AuthorizedUser;
pub use catalog::{ApClass, GradeLevel, PreRequisite, Subject};
pub use student_profile::StudentProfile;
pub use user::{Role, User};

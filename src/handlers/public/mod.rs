// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service metadata, token acquisition, catalog browsing, the student profile
// log and the recommendation proxy.

pub mod auth;
pub mod catalog;
pub mod home;
pub mod recommendations;
pub mod student;

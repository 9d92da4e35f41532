// handlers/mod.rs - Handlers grouped by access tier
//
// Public (no auth) → Protected (JWT, any role) → Elevated (JWT, ADMIN role)
//
// Tiers only group handlers; the guards themselves are attached as route
// layers in `app::app`.

pub mod elevated;
pub mod protected;
pub mod public;

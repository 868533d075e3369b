// handlers/mod.rs - Handler tiers
//
// Public (no session) → Protected (any signed-in role, narrowed per route)
// → Elevated (admin-tier). The tiers group code; the actual gate for every
// route is the ROUTE_POLICIES table in `middleware::policy`.

pub mod elevated;
pub mod input;
pub mod protected;
pub mod public;

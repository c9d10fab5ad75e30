// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (JWT auth). The router applies the JWT
// middleware to every protected route; handlers read the caller from `AuthUser`.

pub mod protected; // JWT authentication required (/api/*)
pub mod public; // No authentication required (health, login, register, username check)

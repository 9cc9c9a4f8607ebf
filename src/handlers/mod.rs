// handlers/mod.rs - Two-tier handler architecture
//
// Public (no authentication) → Protected (bearer token introspected by the
// identity provider on every request).

pub mod protected;
pub mod public;

// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// This module contains domain-specific aggregates and business logic.
// Each aggregate has its own subdirectory with:
// - Value objects
// - Errors
// - Aggregate implementation
// - Service / orchestration against the external collaborators
//
// This layer never talks to actix or the metrics server directly; the actors
// in `crate::actors` drive it.
//
// ============================================================================

pub mod cart;
pub mod delivery;

/// Application layer - Scan orchestration, use cases and DTOs
///
/// This layer contains the application logic that orchestrates
/// domain services and coordinates with infrastructure through ports.
pub mod dto;
pub mod factories;
pub mod queries;
pub mod read_models;
pub mod scan;
pub mod use_cases;

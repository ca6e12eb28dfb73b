// ============================================================================
// Order Domain - Ingestion pipeline for the Order aggregate
// ============================================================================
//
// - Commands (typed upstream payload, parse-or-reject)
// - Transformer (upstream shape → internal draft)
// - Validation (draft → Order, field-level messages)
// - Value objects (Order, OrderItem, OrderRecord, drafts)
// - Errors (OrderError taxonomy)
// - Command Handler (OrderCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod transformer;
pub mod validation;
pub mod errors;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use commands::*;
pub use transformer::*;
pub use validation::*;
pub use errors::*;
pub use command_handler::*;

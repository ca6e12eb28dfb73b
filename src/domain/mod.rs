// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Parsing, transformation and validation of orders. Independent of HTTP;
// persistence is reached only through the `OrderStore` trait.
//
// ============================================================================

pub mod order;

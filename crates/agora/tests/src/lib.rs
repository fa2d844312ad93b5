//! Cross-crate test suites for Agora.
//!
//! - `tests/e2e_tests.rs`: catalog-driven scenarios spanning the type
//!   graph, the attribute layer and the governance engines.
//! - `tests/property_tests.rs`: coercion and attribute-set laws checked
//!   with proptest.

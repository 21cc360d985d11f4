//! Domain core for the storefront catalog engine.
//!
//! Pure logic shared by the persistence layer and any embedding binary:
//! shared id/timestamp aliases, the domain error taxonomy, and
//! characteristic value classification. Nothing in this crate touches the
//! database, so everything here is unit-testable in isolation.

pub mod error;
pub mod types;
pub mod value;

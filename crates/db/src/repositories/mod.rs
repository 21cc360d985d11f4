//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods in two
//! forms: standalone functions that take `&PgPool` and own their
//! transaction, and `*_tx` functions that take
//! `&mut sqlx::Transaction<'_, sqlx::Postgres>` and join the caller's unit
//! of work.

pub mod category_repo;
pub mod characteristic_name_repo;
pub mod product_characteristic_repo;
pub mod product_repo;

pub use category_repo::CategoryRepo;
pub use characteristic_name_repo::CharacteristicNameRepo;
pub use product_characteristic_repo::ProductCharacteristicRepo;
pub use product_repo::ProductRepo;

//! Business logic for the PopModel chat backend.
//!
//! Everything here is expressed against traits (stores, upstream client,
//! identity verifier) so the logic stays testable without I/O. Concrete
//! implementations live in `popmodel-infra`.

pub mod auth;
pub mod gateway;
pub mod memory;
pub mod model;
pub mod spelling;
pub mod store;

// === PUBLIC CONTRACT ===
// Only the contract module should be public for other modules to consume
pub mod contract;

// Re-export the public contract components
pub use contract::model;

// === MODULE DEFINITION ===
pub mod module;
pub use module::Subscriptions;

// === INTERNAL MODULES ===
// These modules are exposed for tests and for the server binary.
// Other modules should depend on `contract` only.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;

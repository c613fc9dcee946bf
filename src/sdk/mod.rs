/// High-level API for the shop's records.
///
/// This module opens the on-disk store and wraps the three collections in a
/// [`Shop`] that applies field rules before anything is written.
pub mod discovery;
pub mod shop;

pub use discovery::open;
pub use shop::Shop;

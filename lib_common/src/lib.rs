// Declare the module folders, each gated by its matching feature so the
// library builds with any feature subset.
#[cfg(feature = "retrieve")]
pub mod retrieve;
#[cfg(feature = "stock")]
pub mod stock;
#[cfg(feature = "utils")]
pub mod utils;

pub mod device;
pub mod tariff;
pub mod types;

pub use device::*;
pub use tariff::*;
pub use types::*;

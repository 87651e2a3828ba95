pub mod distribution;

pub use distribution::{Allocation, Distribution, PaymentDistributor};

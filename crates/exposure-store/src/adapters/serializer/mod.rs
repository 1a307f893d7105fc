//! Serializer Adapters
//!
//! Implementations of the `ExposureSerializer` trait.

mod bincode;

pub use self::bincode::BincodeExposureSerializer;

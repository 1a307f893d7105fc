use crate::domain::entities::StoredExposure;
use crate::domain::errors::SerializationError;
use crate::ports::outbound::ExposureSerializer;

/// Default exposure serializer using bincode.
#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeExposureSerializer;

impl ExposureSerializer for BincodeExposureSerializer {
    fn serialize(&self, exposure: &StoredExposure) -> Result<Vec<u8>, SerializationError> {
        bincode::serialize(exposure).map_err(|e| SerializationError {
            message: e.to_string(),
        })
    }

    fn deserialize(&self, data: &[u8]) -> Result<StoredExposure, SerializationError> {
        bincode::deserialize(data).map_err(|e| SerializationError {
            message: e.to_string(),
        })
    }
}

//! Asset universe port.

use crate::domain::error::SwingscanError;
use crate::domain::universe::Asset;

pub trait AssetPort {
    fn list_assets(&self) -> Result<Vec<Asset>, SwingscanError>;
}

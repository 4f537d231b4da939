pub mod gateway;

pub use crate::domain::model::{Record, RecordCollection};
pub use crate::domain::ports::{ConfigProvider, RecordStore};
pub use crate::utils::error::Result;
pub use gateway::{RecordGateway, TABLE};

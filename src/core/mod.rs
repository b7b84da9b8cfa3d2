pub mod badges;
pub mod formatter;
pub mod lookup;
pub mod soda;
pub mod templates;

pub use crate::domain::model::{EntityKind, PageContext, QueryFilter, RawRecord};
pub use crate::domain::ports::{ConfigProvider, DatasetClient};
pub use crate::utils::error::Result;

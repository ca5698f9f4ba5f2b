pub mod builder;
pub mod params;

pub use builder::{delete, insert, select_list, select_one, update, QueryBuf, Selector};
pub use params::BindValue;

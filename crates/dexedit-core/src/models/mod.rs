pub(crate) mod lenient;
pub mod group;
pub mod record;

pub use group::*;
pub use record::*;

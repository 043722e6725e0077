// /character/mod.rs
mod attributes;
mod inventory;
mod record;
mod resources;
mod skills;

pub use self::attributes::*;
pub use self::inventory::*;
pub use self::record::*;
pub use self::resources::*;
pub use self::skills::*;

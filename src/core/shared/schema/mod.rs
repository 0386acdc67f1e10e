pub mod compliance;
pub use self::compliance::*;

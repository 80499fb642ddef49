pub mod boms;
pub mod exports;
pub mod health;
pub mod imports;
pub mod parts;
pub mod quotations;
pub mod revision;

pub use boms::*;
pub use exports::*;
pub use health::*;
pub use imports::*;
pub use parts::*;
pub use quotations::*;
pub use revision::*;

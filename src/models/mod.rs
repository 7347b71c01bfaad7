pub mod field;
pub mod issue;
pub mod search;

pub use field::*;
pub use issue::*;
pub use search::*;

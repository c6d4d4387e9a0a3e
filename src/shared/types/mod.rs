pub mod clock;
pub mod errors;
pub mod pagination;

pub use clock::*;
pub use errors::*;
pub use pagination::*;

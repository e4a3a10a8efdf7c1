mod product;
mod search;

pub use product::*;
pub use search::*;

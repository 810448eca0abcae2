mod printer;
mod repository;

pub use printer::*;
pub use repository::*;

pub mod mapper;
pub mod table;

pub use mapper::{map_to_visemes, tokenize, VisemeToken};
pub use table::{description, lookup};

pub mod segment;
pub mod tokenize;
pub mod types;

pub use segment::segment;
pub use tokenize::{base_command, tokenize};
pub use types::{Operator, ParsedCommand, Segment};

//! Data types for the program guide.

mod keys;
mod options;
mod position;
mod record;

pub use keys::*;
pub use options::*;
pub use position::*;
pub use record::*;

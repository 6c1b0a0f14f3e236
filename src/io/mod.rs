pub mod input;
pub mod output;
pub mod split;

pub use input::*;
pub use output::*;
pub use split::*;

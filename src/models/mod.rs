pub mod draft;
pub mod macros;
pub mod time;
pub mod week;

pub use draft::*;
pub use time::*;
pub use week::*;

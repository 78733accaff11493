pub mod datetime;
pub mod filesystem;
pub mod string;

pub use datetime::*;
pub use filesystem::*;
pub use string::*;

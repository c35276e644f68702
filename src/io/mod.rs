mod format;
pub mod input;
pub mod output;

pub use format::DocumentFormat;

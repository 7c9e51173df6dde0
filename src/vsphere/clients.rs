mod fake;
mod process;

pub use self::{fake::*, process::*};

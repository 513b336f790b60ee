#[macro_use]
extern crate bitflags;
extern crate byteorder;
#[macro_use]
extern crate yade;

pub mod basic;
pub mod codegen;

mod result;
mod types;

pub use result::*;
pub use types::*;

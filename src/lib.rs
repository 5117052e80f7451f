//! Back-end for the HLB bytecode format.
//!
//! Takes the type-checked tree a front-end produces and turns it into
//! a compact binary module, with an in-process interpreter to run it:
//!
//! - [`codegen`] lowers typed expressions to register code;
//! - [`hlb::validate`] checks type and jump invariants per function;
//! - [`interp`] executes validated modules over tagged values;
//! - [`hlb::write`] / [`hlb::read`] are the binary codec;
//! - [`hlb::dump`] renders the human-readable disassembly.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod hlb;
pub mod interp;
pub mod lookup;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
pub use hlb::{FunDecl, GlobalId, Module, Opcode, RegId};
pub use types::Ty;

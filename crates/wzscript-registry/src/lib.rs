//! Host tables for the script compiler.
//!
//! The game describes everything a script may reference from outside:
//! value types, external and member variables, native functions, named
//! constants, callback triggers and type equivalences.

mod entries;
mod registry;

pub use entries::{
    Callback, ConstValue, Constant, HostFn, HostVariable, MAX_FUNC_PARAMS, NativeFunction,
    TypeEntry,
};
pub use registry::HostRegistry;

//! Route table of the web UI.
//!
//! Routes map a path pattern to a [`View`]. A route with children is a layout
//! shell: when one of its children matches, the resolved [`RouteMatch`] lists
//! the shell first and the child after it.

mod pattern;
mod table;

pub use self::pattern::{PathPattern, Segment};
pub use self::table::{Route, RouteMatch, RouteTable, View};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("empty parameter name in pattern {pattern:?}")]
    EmptyParam { pattern: String },
    #[error("invalid parameter name {name:?} in pattern {pattern:?}")]
    InvalidParam { pattern: String, name: String },
    #[error("duplicate parameter {name:?} in pattern {pattern:?}")]
    DuplicateParam { pattern: String, name: String },
    #[error("duplicate route path {path:?}")]
    DuplicatePath { path: String },
}

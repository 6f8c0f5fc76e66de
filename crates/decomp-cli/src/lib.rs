//! Library components of the `decomp` command-line tool.

#![allow(missing_docs)]

pub mod logging;
pub mod report;

//! Extensions to the standard library used throughout dacu. The modules mirror
//! their standard library counterparts.

pub mod fmt;
pub mod fs;
pub mod result;

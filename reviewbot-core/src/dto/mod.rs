//! Data Transfer Objects for the review API
//!
//! The review API is a third-party service, so responses are parsed
//! leniently: shape problems degrade to empty results instead of errors.

pub mod homework;

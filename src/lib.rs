//! Student directory backed by ordered trees.
//!
//! Each student record holds a surname, initials and an ordered multiset of
//! grades. The directory is an unbalanced binary search tree keyed by
//! surname, supporting ordered insertion, deletion by successor splicing,
//! predicate-filtered in-order listings and a flat text file format.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

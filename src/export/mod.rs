//! Writing notes out as files.

pub mod eml;

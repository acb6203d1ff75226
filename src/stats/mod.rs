//! Statistics Module
//!
//! Sample-size computation for crossover bioequivalence trials.

mod sample_size;

pub use sample_size::{compute_sample_size, SampleSizeParams, SampleSizeResult, LOWER_BE_MARGIN};

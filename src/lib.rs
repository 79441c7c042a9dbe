//! Analysis of discrete functions given as sampled (x, y) pairs.
//!
//! A [`SampledFunction`] is loaded once from a data file and then answers
//! interpolation, root-finding, statistics, least-squares and front
//! detection queries. Out-of-domain queries return
//! [`XyError::OutOfRange`] so callers can report them and carry on.

pub mod config;
pub mod data;
pub mod error;
pub mod report;

pub use data::features::{Peaks, Step};
pub use data::fit::{LinearAccumulator, LinearFit};
pub use data::model::{Range, Sample, SampledFunction, Slope, SlopeFilter};
pub use data::spline::CubicSpline;
pub use error::{XyError, XyResult};

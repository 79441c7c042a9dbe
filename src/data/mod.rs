/// Data layer: sampled functions, loading, and analysis.
///
/// Architecture:
/// ```text
///  .txt / .dat / .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → SampledFunction
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ SampledFunction │  sorted Vec<Sample>; y(x), x(y), statistics
///   └─────────────────┘
///        │
///        ├──► fit       linear least squares
///        ├──► spline    natural cubic spline
///        └──► features  steps, peaks, triggered averages
/// ```

pub mod features;
pub mod fit;
pub mod loader;
pub mod model;
pub mod spline;

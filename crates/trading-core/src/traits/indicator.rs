//! Indicator trait definition.

/// Trait for technical indicators.
///
/// Outputs are aligned index-for-index with the input: element `i` of the
/// result describes the input up to and including `data[i]`. Positions where
/// the indicator is not yet (or not at all) defined are represented in
/// `Output` itself, never by shortening the result.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values for the given data.
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Minimum number of data points before the first value can be defined.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

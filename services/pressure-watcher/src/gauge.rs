//! Gauge reader: turns a photo of the analog gauge into a pressure value

/// Reads a pressure value (PSI) from an image of the gauge
#[cfg_attr(test, mockall::automock)]
pub trait GaugeReader: Send + Sync {
    fn read_pressure(&self, image: &[u8]) -> crate::Result<f64>;
}

/// Stand-in reader until gauge recognition exists. Always reports 0.0 PSI.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderGaugeReader;

impl GaugeReader for PlaceholderGaugeReader {
    fn read_pressure(&self, image: &[u8]) -> crate::Result<f64> {
        tracing::debug!("Processing gauge image ({} bytes)", image.len());
        Ok(0.0)
    }
}

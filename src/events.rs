use crate::constants::Format;
use crate::error::AppError;

/// Result of one background conversion, tagged with the request that produced it.
#[derive(Debug)]
pub struct ConversionOutcome {
    pub request_id: u64,
    pub target: Format,
    pub result: Result<String, AppError>,
}

/// Events sent from background threads to the main UI thread
#[derive(Debug)]
pub enum AppEvent {
    /// Conversion finished, successfully or not
    ConversionComplete(ConversionOutcome),
}

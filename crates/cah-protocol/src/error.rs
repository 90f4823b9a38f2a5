//! Error types for the protocol layer.
//!
//! A `ProtocolError` always comes from moving an envelope across a byte
//! boundary. Game rules never produce one.

/// Failures while turning envelopes into bytes or back.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// An event could not be written out.
    #[cfg(feature = "json")]
    #[error("could not encode event: {0}")]
    Encode(serde_json::Error),

    /// Incoming bytes were not a valid envelope: broken JSON, a missing
    /// field, or an unknown recipient.
    #[cfg(feature = "json")]
    #[error("could not decode event: {0}")]
    Decode(serde_json::Error),
}

//! Byte encodings for outbound envelopes.
//!
//! Inside one process the platform layer reads typed [`Envelope`]s straight
//! off the event channel. A codec is for bridges: a bot written in another
//! language, or a relay that moves events between processes.
//!
//! [`Envelope`]: crate::Envelope

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Turns values into bytes and back.
///
/// One codec value is shared by every lobby, hence `Send + Sync + 'static`.
pub trait Codec: Send + Sync + 'static {
    /// # Errors
    /// [`ProtocolError::Encode`] if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// # Errors
    /// [`ProtocolError::Decode`] if `data` is not a valid `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// JSON over `serde_json`. Events come out internally tagged
/// (`{"type": "RoundStarted", ...}`), which most bot frameworks can switch
/// on directly. Enabled by the default `json` feature.
///
/// ## Example
///
/// ```rust
/// use cah_protocol::{Codec, Envelope, JsonCodec, LobbyId, Recipient};
///
/// let codec = JsonCodec;
/// let envelope = Envelope {
///     lobby: LobbyId(1),
///     seq: 1,
///     recipient: Recipient::All,
///     event: "round started".to_string(),
/// };
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope<String> = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

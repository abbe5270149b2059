use crate::error::{Error, Result};
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of a hex-encoded SHA-256 MAC.
const KEY_LENGTH: usize = 64;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// The provider may hand us either base64 flavor, with or without padding.
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Verifies and decodes a signed request of the form `{hmac_hex}.{base64_json}`.
///
/// The key is the lowercase hex HMAC-SHA256 of the encoded payload, keyed
/// with the client secret shared with the provider. Any failure along the
/// way, including an authentic payload that doesn't decode, is reported as
/// [`Error::InvalidSignedRequest`].
pub fn parse_signed_request(signed_request: &str, client_secret: &str) -> Result<Value> {
    // There's two components here: the signature, and its payload.
    let Some((key, data)) = signed_request.split_once('.') else {
        return Err(reject(signed_request, "missing separator"));
    };

    // Keys are compared exactly, so uppercase hex is not the same key.
    let is_lowercase_hex = key
        .bytes()
        .all(|byte| byte.is_ascii_digit() || (b'a'..=b'f').contains(&byte));
    if key.len() != KEY_LENGTH || !is_lowercase_hex {
        return Err(reject(signed_request, "malformed signature"));
    }
    let signature = hex::decode(key).map_err(|_| reject(signed_request, "malformed signature"))?;

    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())
        .map_err(|_| reject(signed_request, "unusable client secret"))?;
    mac.update(data.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| reject(signed_request, "signature mismatch"))?;

    // The signature holds up; only now do we look at the payload.
    let decoded_payload = STANDARD_LENIENT
        .decode(data)
        .or_else(|_| URL_SAFE_LENIENT.decode(data))
        .map_err(|_| reject(signed_request, "payload is not base64"))?;

    serde_json::from_slice(&decoded_payload)
        .map_err(|_| reject(signed_request, "payload is not JSON"))
}

fn reject(signed_request: &str, reason: &str) -> Error {
    tracing::debug!(reason, "rejected signed request");
    Error::InvalidSignedRequest(format!("{reason}: {signed_request}"))
}

#[cfg(test)]
pub(crate) fn sign(payload: &str, client_secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes()).unwrap();
    mac.update(payload.as_bytes());
    format!("{}.{payload}", hex::encode(mac.finalize().into_bytes()))
}

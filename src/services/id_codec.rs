/*
 * Responsibility
 * - 公開 ID ↔ 内部 ID の変換 (encode/decode)
 * - exam_slots / requests の BIGSERIAL をそのまま外に出さない
 * - Extractor や handler からはこの service を使う (方式変更の影響を局所化)
 */
use sqids::Sqids;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IdCodecError>;

#[derive(Debug, Error)]
pub enum IdCodecError {
    #[error("SQIDS_MIN_LENGTH must be between 0 and 255, got {value}")]
    InvalidMinLength { value: usize },
    #[error("sqids error: {0}")]
    Sqids(#[from] sqids::Error),
    #[error("id must be non-negative, got {value}")]
    NegativeId { value: i64 },
    #[error("invalid public id format")]
    DecodeInvalidFormat,
    #[error("decoded id is out of range")]
    DecodeOutOfRange,
}

#[derive(Clone, Debug)]
pub struct IdCodec {
    sqids: Sqids,
}

impl IdCodec {
    pub fn new(min_length: usize, alphabet: &str) -> Result<Self> {
        let min_length: u8 = min_length
            .try_into()
            .map_err(|_| IdCodecError::InvalidMinLength { value: min_length })?;

        let sqids = Sqids::builder()
            .min_length(min_length)
            .alphabet(alphabet.chars().collect())
            .build()?;

        Ok(Self { sqids })
    }

    pub fn encode(&self, id: i64) -> Result<String> {
        if id < 0 {
            return Err(IdCodecError::NegativeId { value: id });
        }
        Ok(self.sqids.encode(&[id as u64])?)
    }

    /// Only the canonical encoding of an id is accepted, so every row has exactly one public id.
    pub fn decode(&self, public_id: &str) -> Result<i64> {
        let nums = self.sqids.decode(public_id);
        if nums.len() != 1 {
            return Err(IdCodecError::DecodeInvalidFormat);
        }
        let id = i64::try_from(nums[0]).map_err(|_| IdCodecError::DecodeOutOfRange)?;

        if self.encode(id)? != public_id {
            return Err(IdCodecError::DecodeInvalidFormat);
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    fn codec() -> IdCodec {
        IdCodec::new(10, ALPHABET).unwrap()
    }

    #[test]
    fn encoded_ids_decode_back() {
        let codec = codec();
        let public_id = codec.encode(42).unwrap();
        assert!(public_id.len() >= 10);
        assert_eq!(codec.decode(&public_id).unwrap(), 42);
    }

    #[test]
    fn negative_ids_are_rejected() {
        assert!(matches!(
            codec().encode(-1),
            Err(IdCodecError::NegativeId { value: -1 })
        ));
    }

    #[test]
    fn garbage_does_not_decode() {
        assert!(matches!(
            codec().decode("!!!"),
            Err(IdCodecError::DecodeInvalidFormat)
        ));
    }

    #[test]
    fn min_length_must_fit_in_a_byte() {
        assert!(matches!(
            IdCodec::new(300, ALPHABET),
            Err(IdCodecError::InvalidMinLength { value: 300 })
        ));
    }
}

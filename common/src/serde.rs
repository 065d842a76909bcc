use ::serde::de::DeserializeOwned;
use ::serde::Serialize;

use crate::file_format::SerdeFormat;

#[derive(Debug, thiserror::Error)]
pub enum SerdeError {
    #[error("YAML serialization failed")]
    Yaml(#[from] serde_yml::Error),
    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),
    #[error("Binary encoding failed")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("Binary decoding failed")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("Binary payload decompression failed")]
    Decompress(#[from] lz4_flex::block::DecompressError),
    #[error("Text payload is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Binary payload has {trailing} trailing bytes")]
    TrailingBytes { trailing: usize },
}

pub type Result<T> = std::result::Result<T, SerdeError>;

pub fn serialize<T: Serialize>(value: &T, format: SerdeFormat) -> Result<Vec<u8>> {
    let bytes = match format {
        SerdeFormat::Yaml => with_trailing_newline(serde_yml::to_string(value)?),
        SerdeFormat::Json => with_trailing_newline(serde_json::to_string_pretty(value)?),
        SerdeFormat::Bin => {
            let encoded = bincode::serde::encode_to_vec(value, bincode::config::standard())?;
            lz4_flex::compress_prepend_size(&encoded)
        }
    };

    tracing::trace!(?format, len = bytes.len(), "serialized value");
    Ok(bytes)
}

pub fn deserialize<T: DeserializeOwned>(serialized: &[u8], format: SerdeFormat) -> Result<T> {
    match format {
        SerdeFormat::Yaml => {
            let text = std::str::from_utf8(serialized)?;
            Ok(serde_yml::from_str(text)?)
        }
        SerdeFormat::Json => {
            let text = std::str::from_utf8(serialized)?;
            Ok(serde_json::from_str(text)?)
        }
        SerdeFormat::Bin => {
            let decompressed = lz4_flex::decompress_size_prepended(serialized)?;
            let (decoded, read) =
                bincode::serde::decode_from_slice(&decompressed, bincode::config::standard())?;
            if read != decompressed.len() {
                return Err(SerdeError::TrailingBytes {
                    trailing: decompressed.len() - read,
                });
            }
            Ok(decoded)
        }
    }
}

fn with_trailing_newline(mut text: String) -> Vec<u8> {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text.into_bytes()
}

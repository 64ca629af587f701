//! The `codec` module converts between the byte representation of a compiled class and the
//! [`CompiledClass`] the engine works on.
//!
//! Two formats are supported: a JSON document and a compact binary encoding that starts with
//! the [`BINARY_MAGIC`] bytes.  Decoding always validates the class so that the engine never
//! sees a method whose structure it cannot trust.

use crate::class::CompiledClass;
use crate::error::BytemutError;
use std::fmt;
use std::fmt::Formatter;
use std::str::FromStr;

/// The bytes that open every binary encoded class.
pub static BINARY_MAGIC: &[u8; 4] = b"BMUT";

/// The serialized formats a class can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassFormat {
    Json,
    Binary,
}

impl ClassFormat {
    /// Determine the format of `bytes` from their leading content.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The serialized class.
    pub fn detect(bytes: &[u8]) -> Result<ClassFormat, BytemutError> {
        if bytes.starts_with(BINARY_MAGIC) {
            return Ok(ClassFormat::Binary);
        }

        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => Ok(ClassFormat::Json),
            _ => Err(BytemutError::MalformedInput(String::from(
                "unrecognized class encoding",
            ))),
        }
    }

    /// Return the file extension conventionally used for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ClassFormat::Json => "json",
            ClassFormat::Binary => "bmc",
        }
    }
}

impl FromStr for ClassFormat {
    type Err = BytemutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" | "JSON" => Ok(ClassFormat::Json),
            "binary" | "Binary" => Ok(ClassFormat::Binary),
            _last => Err(BytemutError::MalformedInput(format!(
                "unknown class format {}",
                _last
            ))),
        }
    }
}

impl fmt::Display for ClassFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            ClassFormat::Json => "json",
            ClassFormat::Binary => "binary",
        };
        write!(f, "{}", text)
    }
}

/// Trait for objects that read and write one class format.
pub trait ClassCodec: Send + Sync {
    /// Decode and validate a class from `bytes`.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The serialized class.
    fn decode(&self, bytes: &[u8]) -> Result<CompiledClass, BytemutError>;

    /// Encode `class` into bytes.
    ///
    /// # Arguments
    ///
    /// * `class` - The class to serialize.
    fn encode(&self, class: &CompiledClass) -> Result<Vec<u8>, BytemutError>;

    /// Return the format the codec implements.
    fn format(&self) -> ClassFormat;
}

/// Codec for classes stored as JSON documents.
pub struct JsonClassCodec {}

impl ClassCodec for JsonClassCodec {
    fn decode(&self, bytes: &[u8]) -> Result<CompiledClass, BytemutError> {
        let class: CompiledClass = serde_json::from_slice(bytes)
            .map_err(|e| BytemutError::MalformedInput(format!("invalid class document: {}", e)))?;
        class.validate()?;
        Ok(class)
    }

    fn encode(&self, class: &CompiledClass) -> Result<Vec<u8>, BytemutError> {
        Ok(serde_json::to_vec_pretty(class)?)
    }

    fn format(&self) -> ClassFormat {
        ClassFormat::Json
    }
}

/// Codec for the compact binary encoding.
pub struct BinaryClassCodec {}

impl ClassCodec for BinaryClassCodec {
    fn decode(&self, bytes: &[u8]) -> Result<CompiledClass, BytemutError> {
        if !bytes.starts_with(BINARY_MAGIC) {
            return Err(BytemutError::MalformedInput(String::from(
                "missing binary class header",
            )));
        }

        let class: CompiledClass = bincode::deserialize(&bytes[BINARY_MAGIC.len()..])
            .map_err(|e| BytemutError::MalformedInput(format!("invalid binary class: {}", e)))?;
        class.validate()?;
        Ok(class)
    }

    fn encode(&self, class: &CompiledClass) -> Result<Vec<u8>, BytemutError> {
        let mut bytes = BINARY_MAGIC.to_vec();
        bytes.extend(bincode::serialize(class)?);
        Ok(bytes)
    }

    fn format(&self) -> ClassFormat {
        ClassFormat::Binary
    }
}

/// Return the codec that implements `format`.
///
/// # Arguments
///
/// * `format` - The requested class format.
pub fn codec_for_format(format: ClassFormat) -> Box<dyn ClassCodec> {
    match format {
        ClassFormat::Json => Box::new(JsonClassCodec {}),
        ClassFormat::Binary => Box::new(BinaryClassCodec {}),
    }
}

/// Return the codec able to read `bytes`.
///
/// # Arguments
///
/// * `bytes` - The serialized class.
pub fn codec_for_bytes(bytes: &[u8]) -> Result<Box<dyn ClassCodec>, BytemutError> {
    Ok(codec_for_format(ClassFormat::detect(bytes)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::CompiledMethod;
    use crate::instruction::{ArithOp, Instruction, ValueKind};

    fn sample_class() -> CompiledClass {
        let mut class = CompiledClass::new(
            "com/example/Adder",
            vec![CompiledMethod::new(
                "add",
                "(II)I",
                vec![
                    Instruction::LineNumber { line: 3 },
                    Instruction::Load {
                        kind: ValueKind::Int,
                        slot: 1,
                    },
                    Instruction::Load {
                        kind: ValueKind::Int,
                        slot: 2,
                    },
                    Instruction::Arith {
                        kind: ValueKind::Int,
                        op: ArithOp::Add,
                    },
                    Instruction::ReturnValue {
                        kind: ValueKind::Int,
                    },
                ],
            )],
        );
        class.source_file = Some(String::from("Adder.java"));
        class
    }

    #[test]
    fn test_detect_formats() {
        let class = sample_class();
        let json = JsonClassCodec {}.encode(&class).unwrap();
        let binary = BinaryClassCodec {}.encode(&class).unwrap();

        assert_eq!(ClassFormat::detect(&json).unwrap(), ClassFormat::Json);
        assert_eq!(ClassFormat::detect(&binary).unwrap(), ClassFormat::Binary);
        assert_eq!(ClassFormat::detect(b"  \n{}").unwrap(), ClassFormat::Json);
        assert!(ClassFormat::detect(b"\xca\xfe\xba\xbe").is_err());
    }

    #[test]
    fn test_binary_codec_reads_what_it_writes() {
        let class = sample_class();
        let codec = BinaryClassCodec {};
        let decoded = codec.decode(&codec.encode(&class).unwrap()).unwrap();
        assert_eq!(decoded, class);
    }

    #[test]
    fn test_json_codec_reports_malformed_input() {
        let codec = JsonClassCodec {};
        let result = codec.decode(b"{\"name\": \"Broken\"}");
        assert!(matches!(result, Err(BytemutError::MalformedInput(_))));
    }

    #[test]
    fn test_decode_validates_class() {
        let mut class = sample_class();
        class.methods[0].signature.descriptor = String::from("(II");
        let bytes = serde_json::to_vec(&class).unwrap();
        assert!(matches!(
            JsonClassCodec {}.decode(&bytes),
            Err(BytemutError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_truncated_binary_is_malformed() {
        let bytes = BinaryClassCodec {}.encode(&sample_class()).unwrap();
        let truncated = &bytes[..bytes.len() / 2];
        assert!(matches!(
            BinaryClassCodec {}.decode(truncated),
            Err(BytemutError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(ClassFormat::from_str("json").unwrap(), ClassFormat::Json);
        assert_eq!(ClassFormat::from_str("binary").unwrap(), ClassFormat::Binary);
        assert!(ClassFormat::from_str("class").is_err());
    }
}

//! The `descriptor` module parses method descriptors such as `(IJLjava/lang/String;)Z` into
//! [`MethodDescriptor`] values.

use crate::error::BytemutError;
use std::fmt;
use std::fmt::Formatter;
use std::str::FromStr;

/// A single field type appearing in a method descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// A class type, holding the internal class name.
    Object(String),
    /// An array type, holding the component type.
    Array(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Return the number of local/stack slots a value of this type occupies.
    pub fn slot_size(&self) -> usize {
        match self {
            TypeDescriptor::Void => 0,
            TypeDescriptor::Long | TypeDescriptor::Double => 2,
            _ => 1,
        }
    }

    /// Return true if values of the type are references.
    pub fn is_reference(&self) -> bool {
        matches!(self, TypeDescriptor::Object(_) | TypeDescriptor::Array(_))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Void => write!(f, "V"),
            TypeDescriptor::Boolean => write!(f, "Z"),
            TypeDescriptor::Byte => write!(f, "B"),
            TypeDescriptor::Char => write!(f, "C"),
            TypeDescriptor::Short => write!(f, "S"),
            TypeDescriptor::Int => write!(f, "I"),
            TypeDescriptor::Long => write!(f, "J"),
            TypeDescriptor::Float => write!(f, "F"),
            TypeDescriptor::Double => write!(f, "D"),
            TypeDescriptor::Object(name) => write!(f, "L{};", name),
            TypeDescriptor::Array(component) => write!(f, "[{}", component),
        }
    }
}

/// The parsed form of a method descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// The parameter types in declaration order.
    pub parameters: Vec<TypeDescriptor>,

    /// The return type, [`TypeDescriptor::Void`] for methods without a result.
    pub return_type: TypeDescriptor,
}

impl MethodDescriptor {
    /// Return the total number of slots the arguments occupy on the operand stack, not counting
    /// a receiver.
    pub fn argument_slots(&self) -> usize {
        self.parameters.iter().map(|p| p.slot_size()).sum()
    }

    /// Return true if the method does not produce a value.
    pub fn returns_void(&self) -> bool {
        self.return_type == TypeDescriptor::Void
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for parameter in &self.parameters {
            write!(f, "{}", parameter)?;
        }
        write!(f, "){}", self.return_type)
    }
}

/// The largest number of array dimensions a field type may declare.
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

/// Parse one field type starting at `chars[*position]` and advance `position` past it.
fn parse_field_type(
    chars: &[char],
    position: &mut usize,
    allow_void: bool,
) -> Result<TypeDescriptor, String> {
    let mut dimensions = 0;
    while chars.get(*position) == Some(&'[') {
        dimensions += 1;
        if dimensions > MAX_ARRAY_DIMENSIONS {
            return Err(String::from("too many array dimensions"));
        }
        *position += 1;
    }

    let mut field_type = parse_element_type(chars, position, allow_void && dimensions == 0)?;
    for _ in 0..dimensions {
        field_type = TypeDescriptor::Array(Box::new(field_type));
    }

    Ok(field_type)
}

/// Parse a single non-array type starting at `chars[*position]`.
fn parse_element_type(
    chars: &[char],
    position: &mut usize,
    allow_void: bool,
) -> Result<TypeDescriptor, String> {
    let c = match chars.get(*position) {
        Some(c) => *c,
        None => return Err(String::from("unexpected end of descriptor")),
    };
    *position += 1;

    let element_type = match c {
        'V' if allow_void => TypeDescriptor::Void,
        'Z' => TypeDescriptor::Boolean,
        'B' => TypeDescriptor::Byte,
        'C' => TypeDescriptor::Char,
        'S' => TypeDescriptor::Short,
        'I' => TypeDescriptor::Int,
        'J' => TypeDescriptor::Long,
        'F' => TypeDescriptor::Float,
        'D' => TypeDescriptor::Double,
        'L' => {
            let start = *position;
            while *position < chars.len() && chars[*position] != ';' {
                *position += 1;
            }
            if *position >= chars.len() || *position == start {
                return Err(String::from("unterminated class type"));
            }
            let name: String = chars[start..*position].iter().collect();
            *position += 1;
            TypeDescriptor::Object(name)
        }
        other => return Err(format!("unexpected character '{}'", other)),
    };

    Ok(element_type)
}

impl FromStr for MethodDescriptor {
    type Err = BytemutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: String| {
            BytemutError::MalformedInput(format!("invalid method descriptor {}: {}", s, reason))
        };

        let chars: Vec<char> = s.chars().collect();
        if chars.first() != Some(&'(') {
            return Err(malformed(String::from("missing '('")));
        }

        let mut position = 1;
        let mut parameters = Vec::new();
        while chars.get(position) != Some(&')') {
            if position >= chars.len() {
                return Err(malformed(String::from("missing ')'")));
            }
            parameters.push(parse_field_type(&chars, &mut position, false).map_err(malformed)?);
        }
        position += 1;

        let return_type = parse_field_type(&chars, &mut position, true).map_err(malformed)?;
        if position != chars.len() {
            return Err(malformed(String::from("trailing characters")));
        }

        Ok(MethodDescriptor {
            parameters,
            return_type,
        })
    }
}

//! Catalogue of measured operations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BenchError;

/// Independently schedulable benchmark unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    BinaryEqualitySweep,
    TextEqualitySweep,
    BinaryLookupProbe,
    TextLookupProbe,
    BinaryGenericRoundtrip,
    TextGenericRoundtrip,
    BinaryCompactRoundtrip,
    TextCompactRoundtrip,
}

/// Identifier representation an operation works on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    Binary,
    Text,
}

/// Measured category; each has one binary and one text operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Equality,
    Lookup,
    GenericRoundtrip,
    CompactRoundtrip,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::BinaryEqualitySweep,
        Operation::TextEqualitySweep,
        Operation::BinaryLookupProbe,
        Operation::TextLookupProbe,
        Operation::BinaryGenericRoundtrip,
        Operation::TextGenericRoundtrip,
        Operation::BinaryCompactRoundtrip,
        Operation::TextCompactRoundtrip,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::BinaryEqualitySweep => "binary-equality-sweep",
            Operation::TextEqualitySweep => "text-equality-sweep",
            Operation::BinaryLookupProbe => "binary-lookup-probe",
            Operation::TextLookupProbe => "text-lookup-probe",
            Operation::BinaryGenericRoundtrip => "binary-generic-roundtrip",
            Operation::TextGenericRoundtrip => "text-generic-roundtrip",
            Operation::BinaryCompactRoundtrip => "binary-compact-roundtrip",
            Operation::TextCompactRoundtrip => "text-compact-roundtrip",
        }
    }

    pub fn representation(self) -> Representation {
        match self {
            Operation::BinaryEqualitySweep
            | Operation::BinaryLookupProbe
            | Operation::BinaryGenericRoundtrip
            | Operation::BinaryCompactRoundtrip => Representation::Binary,
            _ => Representation::Text,
        }
    }

    pub fn category(self) -> Category {
        match self {
            Operation::BinaryEqualitySweep | Operation::TextEqualitySweep => Category::Equality,
            Operation::BinaryLookupProbe | Operation::TextLookupProbe => Category::Lookup,
            Operation::BinaryGenericRoundtrip | Operation::TextGenericRoundtrip => {
                Category::GenericRoundtrip
            }
            Operation::BinaryCompactRoundtrip | Operation::TextCompactRoundtrip => {
                Category::CompactRoundtrip
            }
        }
    }

    /// Only round-trips can fail
    pub fn is_fallible(self) -> bool {
        matches!(
            self.category(),
            Category::GenericRoundtrip | Category::CompactRoundtrip
        )
    }

    /// Operations whose name contains any of `patterns`; all when empty
    pub fn select(patterns: &[String]) -> Vec<Operation> {
        Self::ALL
            .into_iter()
            .filter(|op| patterns.is_empty() || patterns.iter().any(|p| op.name().contains(p.as_str())))
            .collect()
    }
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Equality,
        Category::Lookup,
        Category::GenericRoundtrip,
        Category::CompactRoundtrip,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Equality => "equality",
            Category::Lookup => "lookup",
            Category::GenericRoundtrip => "generic round-trip",
            Category::CompactRoundtrip => "compact round-trip",
        }
    }

    pub fn operation(self, repr: Representation) -> Operation {
        use Representation::*;
        match (self, repr) {
            (Category::Equality, Binary) => Operation::BinaryEqualitySweep,
            (Category::Equality, Text) => Operation::TextEqualitySweep,
            (Category::Lookup, Binary) => Operation::BinaryLookupProbe,
            (Category::Lookup, Text) => Operation::TextLookupProbe,
            (Category::GenericRoundtrip, Binary) => Operation::BinaryGenericRoundtrip,
            (Category::GenericRoundtrip, Text) => Operation::TextGenericRoundtrip,
            (Category::CompactRoundtrip, Binary) => Operation::BinaryCompactRoundtrip,
            (Category::CompactRoundtrip, Text) => Operation::TextCompactRoundtrip,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| BenchError::UnknownOperation(s.to_string()))
    }
}

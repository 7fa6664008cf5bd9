use std::hash::{Hash, Hasher};

use serde::Serialize;

/// Name of the sentinel guide meaning "no guide assigned".
pub const NONE_NAME: &str = "Aucun";

/// A volunteer escorting the walking bus.
///
/// Identity is the name alone: two guides with the same name and different
/// phone numbers are the same guide.
#[derive(Debug, Clone, Serialize)]
pub struct Guide {
    name: String,
    phone_number: String,
}

impl Guide {
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone_number: phone_number.into(),
        }
    }

    /// The sentinel occupying roster position 0.
    pub fn none() -> Self {
        Self::new(NONE_NAME, "")
    }

    /// Parse a guide-file record: `<name> [<phoneNumber>]`.
    ///
    /// Returns `None` for blank lines. Fields past the second are ignored.
    pub fn parse_record(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let name = fields.next()?;
        let phone = fields.next().unwrap_or("");
        Some(Self::new(name, phone))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn is_none(&self) -> bool {
        self.name == NONE_NAME
    }

    pub fn same_as(&self, other: &Guide) -> bool {
        self.name == other.name
    }
}

impl PartialEq for Guide {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for Guide {}

impl Hash for Guide {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for Guide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

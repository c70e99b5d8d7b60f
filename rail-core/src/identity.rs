use rail_shared::Masked;
use serde::{Deserialize, Serialize};

/// The signed-in account holder. Auth is stubbed, so this comes straight from
/// configuration and is never validated or persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountProfile {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub id_type: String,
    pub id_number: Masked<String>,
}

impl AccountProfile {
    /// Name pre-filled for the first passenger
    pub fn default_passenger_name(&self) -> &str {
        self.full_name.trim()
    }

    /// Initials for the profile header, e.g. "RR"
    pub fn initials(&self) -> String {
        self.full_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

use serde::{Serialize, Deserialize, Serializer};
use std::fmt;

/// A wrapper for sensitive passenger and payment data that masks its value in Debug
/// and Display output. Serialization still writes the real value so transfer
/// payloads stay lossless.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Borrow the real value. Call sites should be easy to grep for.
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> From<T> for Masked<T> {
    fn from(value: T) -> Self {
        Masked(value)
    }
}

impl Masked<String> {
    /// Render the value with everything but the last `visible` characters hidden,
    /// e.g. `•••• 4242` for a card number.
    pub fn tail(&self, visible: usize) -> String {
        let chars: Vec<char> = self.0.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.len() <= visible {
            return "••••".to_string();
        }
        let tail: String = chars[chars.len() - visible..].iter().collect();
        format!("•••• {}", tail)
    }
}

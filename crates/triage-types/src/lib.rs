/// Errors that can occur when creating validated primitive types.
#[derive(Debug, thiserror::Error)]
pub enum PrimitiveError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    EmptyText,
    /// The input number fell outside the declared interval
    #[error("Value {value} is outside the range {min}..={max}")]
    OutOfRange { value: f64, min: f64, max: f64 },
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
/// Used for free-text clinical fields (patient name, symptom description) where an empty
/// value would make the downstream triage decision meaningless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    ///
    /// # Returns
    ///
    /// Returns `Ok(NonEmptyText)` if the trimmed input is non-empty,
    /// or `Err(PrimitiveError::EmptyText)` if it's empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PrimitiveError::EmptyText);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A percentage value guaranteed to lie in `0.0..=100.0`.
///
/// Used for thresholds (such as the fairness deviation threshold) that are
/// resolved once at startup and must never leave their declared domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percentage(f64);

impl Percentage {
    /// Creates a new `Percentage` from the given value.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Percentage)` if the value lies in `0.0..=100.0`,
    /// or `Err(PrimitiveError::OutOfRange)` otherwise (including NaN).
    pub fn new(value: f64) -> Result<Self, PrimitiveError> {
        if !(0.0..=100.0).contains(&value) {
            return Err(PrimitiveError::OutOfRange {
                value,
                min: 0.0,
                max: 100.0,
            });
        }
        Ok(Self(value))
    }

    /// Returns the inner value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl serde::Serialize for Percentage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Percentage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let v = f64::deserialize(deserializer)?;
        Percentage::new(v).map_err(serde::de::Error::custom)
    }
}

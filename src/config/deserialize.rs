// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Rejects empty lists where at least one entry is required.

use nonempty::NonEmpty;
use serde::Deserialize;

pub fn deserialize_nonempty_strings<'de, D>(deserializer: D) -> Result<NonEmpty<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<String> = Vec::deserialize(deserializer)?;
    let values: Vec<String> = values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();

    NonEmpty::from_vec(values).ok_or_else(|| serde::de::Error::custom("list cannot be empty"))
}

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub type NodeLabel = String;

pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// One directed call observed in an analysis unit: `caller` invokes `callee`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub caller: NodeLabel,
    pub callee: NodeLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl EdgeRecord {
    pub fn new(caller: impl Into<NodeLabel>, callee: impl Into<NodeLabel>) -> Self {
        Self {
            caller: caller.into(),
            callee: callee.into(),
            weight: None,
        }
    }

    pub fn weighted(caller: impl Into<NodeLabel>, callee: impl Into<NodeLabel>, weight: f64) -> Self {
        Self {
            caller: caller.into(),
            callee: callee.into(),
            weight: Some(weight),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.caller == self.callee
    }

    pub fn weight_or(&self, default_weight: f64) -> f64 {
        self.weight.unwrap_or(default_weight)
    }
}

/// A user-supplied method identifier fragment.
///
/// `Literal` text is always escaped before it reaches the regex engine.
/// `Raw` keeps the legacy free-text behaviour where a fragment without a
/// dot is compiled verbatim as a regular expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Fragment {
    Literal(String),
    Raw(String),
}

impl Fragment {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw(text.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(text) | Self::Raw(text) => text,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOutcome {
    Connected,
    Unreachable,
    NoMatch,
}

impl QueryOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Unreachable => "unreachable",
            Self::NoMatch => "no_match",
        }
    }
}

/// Result of a distance query between two fragments.
///
/// `distance` is `f64::INFINITY` when no pair of matched nodes is
/// connected or when either side matched nothing. In those cases `path`
/// is empty and the matched fields echo the input fragments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HopResult {
    #[serde(with = "hop_distance")]
    pub distance: f64,
    pub path: Vec<NodeLabel>,
    pub matched_source: NodeLabel,
    pub matched_destination: NodeLabel,
    pub outcome: QueryOutcome,
}

impl HopResult {
    pub fn no_match(source: &str, destination: &str) -> Self {
        Self::unresolved(source, destination, QueryOutcome::NoMatch)
    }

    pub fn unreachable(source: &str, destination: &str) -> Self {
        Self::unresolved(source, destination, QueryOutcome::Unreachable)
    }

    fn unresolved(source: &str, destination: &str, outcome: QueryOutcome) -> Self {
        Self {
            distance: f64::INFINITY,
            path: Vec::new(),
            matched_source: source.to_owned(),
            matched_destination: destination.to_owned(),
            outcome,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.outcome == QueryOutcome::Connected
    }

    pub fn finite_distance(&self) -> Option<f64> {
        self.distance.is_finite().then_some(self.distance)
    }
}

pub fn format_distance(distance: f64) -> String {
    if distance.is_finite() {
        format!("{distance}")
    } else {
        INFINITE_DISTANCE.to_owned()
    }
}

/// Text form of an infinite distance in JSON, matching [`format_distance`].
pub const INFINITE_DISTANCE: &str = "inf";

#[derive(Deserialize)]
#[serde(untagged)]
enum EncodedDistance {
    Number(f64),
    Text(String),
}

impl EncodedDistance {
    fn decode<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Self::Number(number) => Ok(number),
            Self::Text(text) if text == INFINITE_DISTANCE => Ok(f64::INFINITY),
            Self::Text(text) => Err(E::invalid_value(
                serde::de::Unexpected::Str(&text),
                &"a number or \"inf\"",
            )),
        }
    }
}

/// JSON has no infinity; unreachable distances travel as `"inf"`. A `null`
/// distance is read back as unreachable too.
pub mod hop_distance {
    use super::{Deserialize, Deserializer, EncodedDistance, INFINITE_DISTANCE, Serializer};

    pub fn serialize<S>(distance: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if distance.is_finite() {
            serializer.serialize_f64(*distance)
        } else {
            serializer.serialize_str(INFINITE_DISTANCE)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<EncodedDistance>::deserialize(deserializer)? {
            Some(encoded) => encoded.decode(),
            None => Ok(f64::INFINITY),
        }
    }
}

/// Like [`hop_distance`] for metrics that may be skipped: `None` is `null`,
/// an infinite distance is `"inf"`.
pub mod optional_hop_distance {
    use super::{Deserialize, Deserializer, EncodedDistance, INFINITE_DISTANCE, Serializer};

    pub fn serialize<S>(distance: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match distance {
            Some(value) if value.is_finite() => serializer.serialize_some(value),
            Some(_) => serializer.serialize_some(INFINITE_DISTANCE),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<EncodedDistance>::deserialize(deserializer)?
            .map(EncodedDistance::decode)
            .transpose()
    }
}

/// Drops a trailing `(...)` argument list, e.g. `Foo.bar(int)` -> `Foo.bar`.
pub fn strip_signature(label: &str) -> &str {
    if !label.ends_with(')') {
        return label;
    }
    match label.find('(') {
        Some(open) => &label[..open],
        None => label,
    }
}

/// Class portion of a method label. Labels without a dot are their own class.
pub fn class_of_label(label: &str) -> &str {
    let clean = strip_signature(label);
    match clean.rsplit_once('.') {
        Some((class, _)) => class,
        None => clean,
    }
}

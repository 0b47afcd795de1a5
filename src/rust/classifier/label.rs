use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The waste categories the classifier can output.
///
/// Declaration order matches the model's output order: probability `i`
/// belongs to `Label::ALL[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Battery,
    #[serde(rename = "Electronic Waste")]
    ElectronicWaste,
    Glass,
    Metal,
    #[serde(rename = "Organic Waste")]
    OrganicWaste,
    Plastic,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown waste category: {0}")]
pub struct ParseLabelError(pub String);

impl Label {
    pub const COUNT: usize = 6;

    pub const ALL: [Label; Label::COUNT] = [
        Label::Battery,
        Label::ElectronicWaste,
        Label::Glass,
        Label::Metal,
        Label::OrganicWaste,
        Label::Plastic,
    ];

    /// Position of this label in the model's probability vector.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Label> {
        Label::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Battery => "Battery",
            Label::ElectronicWaste => "Electronic Waste",
            Label::Glass => "Glass",
            Label::Metal => "Metal",
            Label::OrganicWaste => "Organic Waste",
            Label::Plastic => "Plastic",
        }
    }

    /// URL-friendly form, e.g. `electronic-waste`.
    pub fn slug(self) -> &'static str {
        match self {
            Label::Battery => "battery",
            Label::ElectronicWaste => "electronic-waste",
            Label::Glass => "glass",
            Label::Metal => "metal",
            Label::OrganicWaste => "organic-waste",
            Label::Plastic => "plastic",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = ParseLabelError;

    /// Accepts either the display name or the slug, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Label::ALL
            .iter()
            .copied()
            .find(|label| {
                label.as_str().eq_ignore_ascii_case(needle) || label.slug().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ParseLabelError(s.to_string()))
    }
}

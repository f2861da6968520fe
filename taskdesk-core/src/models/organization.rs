use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two tenants whose tasks and projects share the same store.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Organization {
    #[default]
    #[serde(rename = "HumanizeIQ")]
    HumanizeIq,
    #[serde(rename = "eTeam")]
    ETeam,
}

const HUMANIZE_IQ_TEAM: &[&str] = &[
    "Rajeev Borborah",
    "Aarushi Borborah",
    "Purva Rao",
    "Praniket Utturkar",
    "Aman Kumar Srivastava",
    "Aditi Jor",
    "Kaysan Shaikh",
    "Anubha Chakrovarty",
    "Prathyusha Shetty",
    "Palak Srivastava",
    "Ashishree Phatak",
    "Sahana Khanai",
    "Sriramkiran Devarakonda",
];

const ETEAM_TEAM: &[&str] = &["Rajeev Borborah", "Ben Thakur", "Faizan Syed"];

impl Organization {
    pub const ALL: [Organization; 2] = [Self::HumanizeIq, Self::ETeam];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HumanizeIq => "HumanizeIQ",
            Self::ETeam => "eTeam",
        }
    }

    /// Accepts the stored spelling as well as any casing of it.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "humanizeiq" => Some(Self::HumanizeIq),
            "eteam" => Some(Self::ETeam),
            _ => None,
        }
    }

    /// Known team members, used as assignee choices and extraction hints.
    pub fn team_members(&self) -> &'static [&'static str] {
        match self {
            Self::HumanizeIq => HUMANIZE_IQ_TEAM,
            Self::ETeam => ETEAM_TEAM,
        }
    }
}

impl fmt::Display for Organization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

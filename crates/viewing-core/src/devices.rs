//! Coarse device classification from the export's free-form device strings.
//!
//! Device types look like `"Samsung 2015 Tizen TV"`, `"Apple iPhone 12"` or
//! `"Chrome PC (Cadmium)"`. Rules are checked in order; the first match wins.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    Tv,
    StreamingDevice,
    GameConsole,
    Computer,
    Tablet,
    Mobile,
    Other,
}

impl DeviceCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tv => "TV",
            Self::StreamingDevice => "Streaming Device",
            Self::GameConsole => "Game Console",
            Self::Computer => "Computer",
            Self::Tablet => "Tablet",
            Self::Mobile => "Mobile",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

struct Rule {
    category: DeviceCategory,
    /// Whole words, matched against the tokenised device string.
    words: &'static [&'static str],
    /// Substrings, matched against the lowercased device string.
    phrases: &'static [&'static str],
}

const RULES: &[Rule] = &[
    Rule {
        category: DeviceCategory::GameConsole,
        words: &["ps3", "ps4", "ps5", "xbox", "wii", "playstation", "nintendo"],
        phrases: &["play station"],
    },
    Rule {
        category: DeviceCategory::StreamingDevice,
        words: &["chromecast", "roku", "shield"],
        phrases: &["fire tv", "firetv", "apple tv", "appletv", "streaming stick", "tv stick"],
    },
    Rule {
        category: DeviceCategory::Tablet,
        words: &["ipad", "tablet", "kindle"],
        phrases: &[],
    },
    Rule {
        category: DeviceCategory::Tv,
        words: &["tv", "tizen", "webos", "bravia", "vizio", "hisense", "television"],
        phrases: &["smart tv"],
    },
    Rule {
        category: DeviceCategory::Mobile,
        words: &["iphone", "phone", "mobile", "android", "smartphone", "galaxy"],
        phrases: &[],
    },
    Rule {
        category: DeviceCategory::Computer,
        words: &["pc", "mac", "macbook", "windows", "chrome", "firefox", "edge", "safari", "opera", "linux", "browser"],
        phrases: &["chromebook"],
    },
];

/// Classify a device type string into a [`DeviceCategory`].
pub fn categorize_device(device_type: &str) -> DeviceCategory {
    let lower = device_type.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    RULES
        .iter()
        .find(|rule| {
            rule.words.iter().any(|w| tokens.contains(w))
                || rule.phrases.iter().any(|p| lower.contains(p))
        })
        .map(|rule| rule.category)
        .unwrap_or(DeviceCategory::Other)
}

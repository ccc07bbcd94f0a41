use serde::Serialize;

/// Tone that gets the dedicated high-importance notification channel with
/// a custom sound; every other tone rides the default channel.
pub const TONE_BELL: &str = "bell";

pub const DEFAULT_TONE: &str = TONE_BELL;

/// A selectable notification sound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneItem {
    pub key: &'static str,
    pub label: &'static str,
}

pub const TONES: [ToneItem; 5] = [
    ToneItem {
        key: TONE_BELL,
        label: "Bell",
    },
    ToneItem {
        key: "ding",
        label: "Ding",
    },
    ToneItem {
        key: "chime",
        label: "Chime",
    },
    ToneItem {
        key: "digital",
        label: "Digital",
    },
    ToneItem {
        key: "wood",
        label: "Wood",
    },
];

pub fn tone_exists(key: &str) -> bool {
    TONES.iter().any(|tone| tone.key == key)
}

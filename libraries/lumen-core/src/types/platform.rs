/// Host platform classification
use serde::{Deserialize, Serialize};

/// Kind of host the player runs on
///
/// Constrained platforms have unreliable autoplay and buffering behaviour:
/// the buffer watchdog only runs there, and seek-resume waits longer before
/// touching the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Desktop-class host
    #[default]
    Standard,

    /// Mobile or otherwise constrained host
    Constrained,
}

impl Platform {
    /// Classify a host from its user agent string
    ///
    /// iOS and Android browsers, and anything advertising itself as mobile,
    /// are treated as constrained.
    pub fn from_user_agent(user_agent: &str) -> Self {
        const CONSTRAINED_MARKERS: [&str; 5] = ["iphone", "ipad", "ipod", "android", "mobile"];

        let ua = user_agent.to_ascii_lowercase();
        if CONSTRAINED_MARKERS.iter().any(|marker| ua.contains(marker)) {
            Self::Constrained
        } else {
            Self::Standard
        }
    }

    /// Whether this is a constrained platform
    pub fn is_constrained(self) -> bool {
        self == Self::Constrained
    }
}

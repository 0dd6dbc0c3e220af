/// A speech engine voice.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Voice {
    pub name: String,
    /// BCP-47-ish language tag as reported by the engine (`en-IN`, `hi`, ...).
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// Voice names tried first, in order.
pub const DEFAULT_PREFERRED_VOICES: &[&str] = &[
    "Google UK English Male",
    "Microsoft Heera",
    "Microsoft Ravi",
    "Microsoft Prabhat",
    "English (India)",
];

const FALLBACK_TOKENS: &[&str] = &["en", "india", "indian"];

/// Pick a narration voice.
///
/// Preference order wins: the first preferred name that is a case-insensitive substring of some
/// voice name selects that voice. Otherwise the first voice whose `"name lang"` contains `en`,
/// `india` or `indian` is used. `None` means the engine default voice.
pub fn pick_voice<'a, S: AsRef<str>>(voices: &'a [Voice], preferred: &[S]) -> Option<&'a Voice> {
    for want in preferred {
        let want = want.as_ref().to_lowercase();
        if want.is_empty() {
            continue;
        }
        if let Some(v) = voices.iter().find(|v| v.name.to_lowercase().contains(&want)) {
            return Some(v);
        }
    }
    voices.iter().find(|v| {
        let hay = format!("{} {}", v.name, v.lang).to_lowercase();
        FALLBACK_TOKENS.iter().any(|t| hay.contains(t))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/narration/voice.rs"]
mod tests;

//! Localized user-facing text.

use serde::Deserialize;

/// Display language for user-facing messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Turkish.
    #[default]
    Tr,
    /// English.
    En,
}

impl Locale {
    /// Parse a locale code such as `"tr"` or `"en-US"`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let lang = code.split(['-', '_']).next().unwrap_or_default().to_ascii_lowercase();
        match lang.as_str() {
            "tr" => Some(Self::Tr),
            "en" => Some(Self::En),
            _ => None,
        }
    }
}

/// The message table for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    /// Shown when an empty prompt is submitted.
    pub empty_prompt: &'static str,
    /// Shown when image generation fails without a message of its own.
    pub generation_failed: &'static str,
    /// Written into the prompt while a random idea is requested.
    pub random_placeholder: &'static str,
    /// Shown when the random prompt request fails.
    pub random_failed: &'static str,
    /// Spinner text.
    pub loading: &'static str,
    /// Label of the prompt line.
    pub prompt_label: &'static str,
    /// Hint listing the input bar actions.
    pub actions_hint: &'static str,
    /// Dictation indicator while listening.
    pub listening: &'static str,
}

const TR: Messages = Messages {
    empty_prompt: "Lütfen bir metin girin.",
    generation_failed: "Görsel oluşturulurken bir hata oluştu. Lütfen tekrar deneyin.",
    random_placeholder: "Rastgele bir fikir üretiliyor...",
    random_failed: "Rastgele metin üretilirken bir hata oluştu.",
    loading: "Oluşturuluyor...",
    prompt_label: "İstem",
    actions_hint: "[Enter] oluştur  /random rastgele  /ratio oran",
    listening: "dinleniyor",
};

const EN: Messages = Messages {
    empty_prompt: "Please enter some text.",
    generation_failed: "Something went wrong while generating images. Please try again.",
    random_placeholder: "Generating a random idea...",
    random_failed: "Something went wrong while generating a random prompt.",
    loading: "Generating...",
    prompt_label: "Prompt",
    actions_hint: "[Enter] generate  /random random  /ratio ratio",
    listening: "listening",
};

impl Messages {
    /// The message table for the given locale.
    #[must_use]
    pub fn for_locale(locale: Locale) -> &'static Self {
        match locale {
            Locale::Tr => &TR,
            Locale::En => &EN,
        }
    }
}

use serde::Serialize;

use crate::{Condition, DisplayedReading, ScreenState};

/// Identifier of the picture drawn next to a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKey {
    Sun,
    Rain,
    Cloud,
    Snow,
}

impl ImageKey {
    pub fn for_condition(condition: Condition) -> Self {
        match condition {
            Condition::Sunny => ImageKey::Sun,
            Condition::Rainy => ImageKey::Rain,
            Condition::Cloudy => ImageKey::Cloud,
            Condition::Snowy => ImageKey::Snow,
        }
    }

    /// Map a free-form condition label; anything unrecognised has no image.
    pub fn from_label(label: &str) -> Option<Self> {
        Condition::try_from(label).ok().map(Self::for_condition)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKey::Sun => "sun",
            ImageKey::Rain => "rain",
            ImageKey::Cloud => "cloud",
            ImageKey::Snow => "snow",
        }
    }
}

/// Everything a renderer needs for one frame of the screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub show_spinner: bool,
    pub submit_enabled: bool,
    pub show_result: Option<DisplayedReading>,
    pub show_error: Option<String>,
    pub image_key: Option<ImageKey>,
    pub show_wind_icon: bool,
}

pub fn derive_view_model(state: &ScreenState) -> ViewModel {
    let loading = state.is_loading();
    let show_result = if loading { None } else { state.last_reading().cloned() };
    let show_error = if loading {
        None
    } else {
        state.last_error().map(|e| e.inline_message().to_string())
    };

    let image_key = show_result
        .as_ref()
        .map(|r| ImageKey::for_condition(r.reading.condition));
    let show_wind_icon = show_result.as_ref().is_some_and(|r| r.reading.is_windy());

    ViewModel {
        show_spinner: loading,
        submit_enabled: !loading,
        show_result,
        show_error,
        image_key,
        show_wind_icon,
    }
}

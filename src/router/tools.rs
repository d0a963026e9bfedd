/// Tools the agent may call on this client
///
/// Execution is mocked: every tool answers with a fixed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    CurrentWeather,
    MusicPlayer,
    SendMessage,
}

impl ToolKind {
    /// Resolve a tool name as sent by the agent
    ///
    /// Matching ignores case and underscores, so `get_current_weather` and
    /// `GetCurrentWeather` are the same tool.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "getcurrentweather" => Some(Self::CurrentWeather),
            "musicplayer" => Some(Self::MusicPlayer),
            "sendmessage" => Some(Self::SendMessage),
            _ => None,
        }
    }

    pub fn result(&self) -> &'static str {
        match self {
            Self::CurrentWeather => "It is snowing today, with a low of -10°C.",
            Self::MusicPlayer => "Found a song by Li Si called \"Within a Thousand Miles\".",
            Self::SendMessage => "Message sent.",
        }
    }
}

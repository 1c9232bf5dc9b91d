use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Cycle transition that can be announced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CycleEvent {
    #[serde(rename = "inicio_pomodoro")]
    StartFocus,
    #[serde(rename = "fim_pomodoro")]
    EndFocus,
    #[serde(rename = "inicio_intervalo")]
    StartBreak,
    #[serde(rename = "fim_intervalo")]
    EndBreak,
}

impl CycleEvent {
    pub const ALL: [CycleEvent; 4] = [
        CycleEvent::StartFocus,
        CycleEvent::EndFocus,
        CycleEvent::StartBreak,
        CycleEvent::EndBreak,
    ];

    /// Wire name of the event type.
    pub fn as_str(self) -> &'static str {
        match self {
            CycleEvent::StartFocus => "inicio_pomodoro",
            CycleEvent::EndFocus => "fim_pomodoro",
            CycleEvent::StartBreak => "inicio_intervalo",
            CycleEvent::EndBreak => "fim_intervalo",
        }
    }

    pub fn content(self) -> &'static NotificationContent {
        match self {
            CycleEvent::StartFocus => &START_FOCUS,
            CycleEvent::EndFocus => &END_FOCUS,
            CycleEvent::StartBreak => &START_BREAK,
            CycleEvent::EndBreak => &END_BREAK,
        }
    }
}

impl fmt::Display for CycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CycleEvent {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CycleEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownEventType(s.to_string()))
    }
}

/// What to show and play for a cycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationContent {
    #[serde(rename = "type")]
    pub event: CycleEvent,
    pub title: &'static str,
    pub message: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    pub sound_file: &'static str,
}

static START_FOCUS: NotificationContent = NotificationContent {
    event: CycleEvent::StartFocus,
    title: "Pomodoro Iniciado",
    message: "Hora de focar! Seu Pomodoro começou.",
    color: "#FF5252",
    icon: "timer",
    sound_file: "/assets/sounds/start-pomodoro.mp3",
};

static END_FOCUS: NotificationContent = NotificationContent {
    event: CycleEvent::EndFocus,
    title: "Pomodoro Concluído",
    message: "Pomodoro concluído! Hora de uma pausa.",
    color: "#FF5252",
    icon: "timer",
    sound_file: "/assets/sounds/end-pomodoro.mp3",
};

static START_BREAK: NotificationContent = NotificationContent {
    event: CycleEvent::StartBreak,
    title: "Intervalo Iniciado",
    message: "Seu intervalo começou. Aproveite para descansar.",
    color: "#4CAF50",
    icon: "coffee",
    sound_file: "/assets/sounds/start-break.mp3",
};

static END_BREAK: NotificationContent = NotificationContent {
    event: CycleEvent::EndBreak,
    title: "Intervalo Finalizado",
    message: "Intervalo finalizado. Prepare-se para o próximo Pomodoro.",
    color: "#4CAF50",
    icon: "coffee",
    sound_file: "/assets/sounds/end-break.mp3",
};

/// Resolve content from a wire type string.
pub fn resolve_content(event_type: &str) -> Result<&'static NotificationContent, ValidationError> {
    Ok(event_type.parse::<CycleEvent>()?.content())
}

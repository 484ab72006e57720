//! Display screens and the reducer that picks one from engine notifications.

use whiskers_core::{Notification, OccupancyState};

/// What the small status display shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Boot,
    /// Live smoothed mass, with the previous visit's weight once there is one.
    Weight {
        weight_g: f32,
        last_g: Option<f32>,
        occupied: bool,
    },
    Tare,
    Calibration { target_g: i32 },
    Measuring { target_g: i32 },
    Calibrated { scale_factor: f32 },
    Error(String),
}

impl Screen {
    /// Text lines, top to bottom.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Boot => vec!["Weight Whiskers".into()],
            Self::Weight {
                weight_g,
                last_g,
                occupied,
            } => {
                let marker = if *occupied { " *" } else { "" };
                let mut lines = vec![format!("{weight_g:.0}g{marker}")];
                if let Some(last) = last_g {
                    lines.push(format!("Last: {last:.0}g"));
                }
                lines
            }
            Self::Tare => vec!["Tare...".into()],
            Self::Calibration { target_g } => {
                vec![format!("Place {target_g}g"), "and press button".into()]
            }
            Self::Measuring { target_g } => vec![format!("Measuring {target_g}g...")],
            Self::Calibrated { scale_factor } => vec![format!("Factor {scale_factor:.4}")],
            Self::Error(msg) => vec![msg.clone()],
        }
    }
}

/// Folds notifications into the screen that should be visible now.
#[derive(Debug, Clone)]
pub struct ScreenState {
    screen: Screen,
    last_visit_g: Option<f32>,
}

impl Default for ScreenState {
    fn default() -> Self {
        Self {
            screen: Screen::Boot,
            last_visit_g: None,
        }
    }
}

impl ScreenState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn last_visit_g(&self) -> Option<f32> {
        self.last_visit_g
    }

    /// Apply one notification. Returns `true` when the visible screen changed.
    pub fn apply(&mut self, n: &Notification) -> bool {
        let next = match n {
            Notification::Reading { smoothed_g, state } => Screen::Weight {
                weight_g: *smoothed_g,
                last_g: self.last_visit_g,
                occupied: *state == OccupancyState::Occupied,
            },
            Notification::VisitCompleted(record) => {
                self.last_visit_g = Some(record.weight_g);
                Screen::Weight {
                    weight_g: record.weight_g,
                    last_g: self.last_visit_g,
                    occupied: false,
                }
            }
            Notification::Tared { .. } => Screen::Tare,
            Notification::SensorUnavailable => Screen::Error("Scale error".into()),
            Notification::CalibrationPrompt { target_g } => Screen::Calibration {
                target_g: *target_g,
            },
            Notification::CalibrationRejected { target_g, .. } => Screen::Calibration {
                target_g: *target_g,
            },
            Notification::CalibrationMeasuring { target_g } => Screen::Measuring {
                target_g: *target_g,
            },
            Notification::Calibrated { scale_factor } => Screen::Calibrated {
                scale_factor: *scale_factor,
            },
            Notification::CalibrationAborted { .. } => Screen::Error("Calibration aborted".into()),
            Notification::VisitStarted | Notification::VisitDiscarded { .. } => return false,
        };
        if next == self.screen {
            return false;
        }
        self.screen = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_screen_rounds_to_whole_grams() {
        let s = Screen::Weight {
            weight_g: 4512.6,
            last_g: Some(4390.2),
            occupied: false,
        };
        assert_eq!(s.lines(), vec!["4513g".to_string(), "Last: 4390g".to_string()]);
    }

    #[test]
    fn calibration_prompt_names_the_target() {
        let s = Screen::Calibration { target_g: 500 };
        assert_eq!(s.lines(), vec!["Place 500g", "and press button"]);
    }

    #[test]
    fn boot_screen_until_first_notification() {
        let st = ScreenState::new();
        assert_eq!(st.screen(), &Screen::Boot);
        assert_eq!(st.last_visit_g(), None);
    }
}

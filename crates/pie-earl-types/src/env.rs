use serde::{Deserialize, Serialize};

/// Runtime semantics selector: `mode` picks which of
/// gather/view/evaluate/author behavior applies, `role` distinguishes
/// student- vs instructor-facing rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Gather,
    View,
    Evaluate,
    Author,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Env {
    pub mode: Mode,
    pub role: Role,
}

impl Env {
    pub fn new(mode: Mode, role: Role) -> Self {
        Self { mode, role }
    }

    /// `view`/`evaluate` are the two modes that require a controller to be
    /// present after load.
    pub fn requires_controller(&self) -> bool {
        matches!(self.mode, Mode::View | Mode::Evaluate)
    }
}

// Types and enums for screen navigation
use crate::vision::Frame;
use serde::Serialize;
use std::fmt;

/// Screen context inferred from a single frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavigationState {
    OnTerritory,
    OnMap,
    DialogOpen,
    Unknown,
}

/// How a successful recovery reached the territory screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recovery {
    AlreadyOnTerritory,
    ReturnedFromMap,
    DismissedDialog,
}

impl Recovery {
    pub fn actions_taken(&self) -> u32 {
        match self {
            Recovery::AlreadyOnTerritory => 0,
            Recovery::ReturnedFromMap | Recovery::DismissedDialog => 1,
        }
    }

    pub fn starting_state(&self) -> NavigationState {
        match self {
            Recovery::AlreadyOnTerritory => NavigationState::OnTerritory,
            Recovery::ReturnedFromMap => NavigationState::OnMap,
            Recovery::DismissedDialog => NavigationState::DialogOpen,
        }
    }
}

/// Where a recovery walk gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureStage {
    /// No known control was visible, nothing was tapped
    Unrecognized,
    /// A dialog was closed but the territory marker did not come back
    DialogPersisted,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Unrecognized => write!(f, "no known control on screen"),
            FailureStage::DialogPersisted => {
                write!(f, "territory marker still missing after closing a dialog")
            }
        }
    }
}

/// Which frame a lookup inspects
#[derive(Debug, Clone, Copy)]
pub enum Capture<'a> {
    /// Take a new screenshot first
    Fresh,
    /// Reuse the most recent screenshot (captures one if there is none yet)
    Last,
    /// Use a frame the caller already holds
    Frame(&'a Frame),
}

//! Response Protocol
//!
//! The answer a module gives after handling one key input, and the
//! direction of travel through the module sequence.

use std::str::FromStr;

use crate::NavError;

/// Result of a module handling one key input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    /// Handled; suppress the native default
    Success,
    /// Hand over to the previous module
    MovePrev,
    /// Hand over to the next module
    MoveNext,
    /// Not handled; native handling proceeds
    NoResponse,
}

impl ResponseCode {
    /// Response that travels in `direction`
    pub fn toward(direction: Direction) -> Self {
        match direction {
            Direction::Forward => Self::MoveNext,
            Direction::Backward => Self::MovePrev,
        }
    }

    /// Direction of travel for move responses
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::MoveNext => Some(Direction::Forward),
            Self::MovePrev => Some(Direction::Backward),
            Self::Success | Self::NoResponse => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::MovePrev => "prev",
            Self::MoveNext => "next",
            Self::NoResponse => "none",
        }
    }
}

impl FromStr for ResponseCode {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "prev" => Ok(Self::MovePrev),
            "next" => Ok(Self::MoveNext),
            "none" => Ok(Self::NoResponse),
            other => Err(NavError::ModuleContractViolation(format!(
                "unrecognized response {other:?}"
            ))),
        }
    }
}

/// Direction of travel through the module sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// +1 or -1
    pub fn sign(self) -> isize {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }

    /// Tab goes forward, Shift+Tab backward
    pub fn from_shift(shift: bool) -> Self {
        if shift { Self::Backward } else { Self::Forward }
    }

    /// Step an index one place; None when it would go below zero
    pub fn step(self, index: usize) -> Option<usize> {
        match self {
            Self::Forward => index.checked_add(1),
            Self::Backward => index.checked_sub(1),
        }
    }
}

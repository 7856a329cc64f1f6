use crate::sys::fetch::Ticket;
use skiphire::{FetchError, ImageUrl, SkipOption};
use std::str::FromStr;
use std::sync::Arc;

/// Messages from the background runtime to the GUI thread.
#[derive(Debug)]
pub enum AppEvent {
    SkipsLoaded {
        ticket: Ticket,
        result: Result<Vec<SkipOption>, Arc<FetchError>>,
    },
    ImageLoaded {
        url: ImageUrl,
        bytes: Vec<u8>,
    },
    MapLoaded {
        ticket: Ticket,
        bytes: Vec<u8>,
    },
    Control(ControlCommand),
    ConfigReload,
}

/// Work the GUI hands to the background runtime.
#[derive(Debug, Clone)]
pub enum RuntimeRequest {
    FetchSkips {
        ticket: Ticket,
        location: skiphire::Location,
    },
    FetchImages(Vec<ImageUrl>),
    FetchMap {
        ticket: Ticket,
        url: String,
    },
    Reconfigure(crate::config::ApiConfig),
}

/// Line protocol of the control socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Next,
    Prev,
    Rotate(isize),
    GoTo(isize),
    Reload,
}

impl ControlCommand {
    pub fn as_line(&self) -> String {
        match self {
            Self::Next => "next".to_string(),
            Self::Prev => "prev".to_string(),
            Self::Rotate(n) => format!("rotate {n}"),
            Self::GoTo(i) => format!("goto {i}"),
            Self::Reload => "reload".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown control command '{0}'")]
pub struct UnknownCommand(pub String);

impl FromStr for ControlCommand {
    type Err = UnknownCommand;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownCommand(line.trim().to_string());
        let mut words = line.split_whitespace();
        let command = words.next().ok_or_else(unknown)?.to_ascii_lowercase();
        let argument = words.next().map(str::parse::<isize>);
        if words.next().is_some() {
            return Err(unknown());
        }

        match (command.as_str(), argument) {
            ("next", None) => Ok(Self::Next),
            ("prev", None) => Ok(Self::Prev),
            ("reload", None) => Ok(Self::Reload),
            ("rotate", Some(Ok(n))) => Ok(Self::Rotate(n)),
            ("goto", Some(Ok(i))) => Ok(Self::GoTo(i)),
            _ => Err(unknown()),
        }
    }
}

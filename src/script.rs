//! Scripted input sequences for `eresources-nav simulate`.
//!
//! One step per line, `#` starts a comment:
//!
//! ```text
//! toggle            # click the toggle
//! wait 5s           # idle for five seconds (also: 5000, 5000ms)
//! enter             # pointer enters the rail
//! leave             # pointer leaves the rail
//! click /doaj       # click the item routed to /doaj
//! ```

use std::time::Duration;

use crate::models::RouteId;
use crate::rail::RailInput;

/// Errors while parsing a script
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: '{command}' needs an argument")]
    MissingArgument { line: usize, command: String },

    #[error("line {line}: invalid duration '{value}'")]
    InvalidDuration { line: usize, value: String },

    #[error("line {line}: unexpected argument '{value}'")]
    UnexpectedArgument { line: usize, value: String },
}

/// A single scripted step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Deliver an input to the rail
    Input(RailInput),
    /// Let time pass
    Wait(Duration),
}

/// A parsed script with the source line of every step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    steps: Vec<(usize, ScriptStep)>,
}

impl Script {
    /// Parse a script
    pub fn parse(source: &str) -> Result<Self, ScriptError> {
        let mut steps = Vec::new();

        for (index, raw) in source.lines().enumerate() {
            let line = index + 1;
            let text = raw.split('#').next().unwrap_or_default().trim();
            if text.is_empty() {
                continue;
            }

            let mut words = text.split_whitespace();
            let command = words.next().unwrap_or_default().to_lowercase();
            let argument = words.next();
            if let Some(extra) = words.next() {
                return Err(ScriptError::UnexpectedArgument {
                    line,
                    value: extra.to_string(),
                });
            }

            let step = match command.as_str() {
                "toggle" => no_argument(line, argument, RailInput::ToggleClick)?,
                "enter" => no_argument(line, argument, RailInput::PointerEnter)?,
                "leave" => no_argument(line, argument, RailInput::PointerLeave)?,
                "click" => {
                    let route = argument.ok_or_else(|| ScriptError::MissingArgument {
                        line,
                        command: command.clone(),
                    })?;
                    ScriptStep::Input(RailInput::ItemClick(RouteId::from(route)))
                }
                "wait" => {
                    let value = argument.ok_or_else(|| ScriptError::MissingArgument {
                        line,
                        command: command.clone(),
                    })?;
                    let duration =
                        parse_duration(value).ok_or_else(|| ScriptError::InvalidDuration {
                            line,
                            value: value.to_string(),
                        })?;
                    ScriptStep::Wait(duration)
                }
                _ => {
                    return Err(ScriptError::UnknownCommand { line, command });
                }
            };
            steps.push((line, step));
        }

        Ok(Self { steps })
    }

    /// Steps with their source line numbers
    pub fn steps(&self) -> &[(usize, ScriptStep)] {
        &self.steps
    }

    /// Total scripted waiting time
    pub fn duration(&self) -> Duration {
        self.steps
            .iter()
            .filter_map(|(_, step)| match step {
                ScriptStep::Wait(d) => Some(*d),
                ScriptStep::Input(_) => None,
            })
            .sum()
    }

    /// Whether the script has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn no_argument(
    line: usize,
    argument: Option<&str>,
    input: RailInput,
) -> Result<ScriptStep, ScriptError> {
    match argument {
        Some(value) => Err(ScriptError::UnexpectedArgument {
            line,
            value: value.to_string(),
        }),
        None => Ok(ScriptStep::Input(input)),
    }
}

/// Parse `1500`, `1500ms` or `1.5s`
pub fn parse_duration(value: &str) -> Option<Duration> {
    if let Some(ms) = value.strip_suffix("ms") {
        return ms.parse::<u64>().ok().map(Duration::from_millis);
    }
    if let Some(secs) = value.strip_suffix('s') {
        let secs = secs.parse::<f64>().ok()?;
        if !secs.is_finite() || secs < 0.0 {
            return None;
        }
        return Some(Duration::from_secs_f64(secs));
    }
    value.parse::<u64>().ok().map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = Script::parse(
            "# walkthrough\n\
             toggle\n\
             wait 10s   # stage one\n\
             \n\
             enter\n\
             click /doaj\n\
             leave\n\
             wait 5000\n",
        )
        .unwrap();

        let steps: Vec<&ScriptStep> = script.steps().iter().map(|(_, s)| s).collect();
        assert_eq!(
            steps,
            vec![
                &ScriptStep::Input(RailInput::ToggleClick),
                &ScriptStep::Wait(Duration::from_secs(10)),
                &ScriptStep::Input(RailInput::PointerEnter),
                &ScriptStep::Input(RailInput::ItemClick(RouteId::from("/doaj"))),
                &ScriptStep::Input(RailInput::PointerLeave),
                &ScriptStep::Wait(Duration::from_millis(5000)),
            ]
        );
        assert_eq!(script.steps()[1].0, 3);
        assert_eq!(script.duration(), Duration::from_secs(15));
    }

    #[test]
    fn test_parse_errors_report_line() {
        assert_eq!(
            Script::parse("toggle\njump"),
            Err(ScriptError::UnknownCommand {
                line: 2,
                command: "jump".to_string()
            })
        );
        assert_eq!(
            Script::parse("click"),
            Err(ScriptError::MissingArgument {
                line: 1,
                command: "click".to_string()
            })
        );
        assert_eq!(
            Script::parse("wait soon"),
            Err(ScriptError::InvalidDuration {
                line: 1,
                value: "soon".to_string()
            })
        );
        assert_eq!(
            Script::parse("toggle twice"),
            Err(ScriptError::UnexpectedArgument {
                line: 1,
                value: "twice".to_string()
            })
        );
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("250"), Some(Duration::from_millis(250)));
        assert_eq!(parse_duration("250ms"), Some(Duration::from_millis(250)));
        assert_eq!(parse_duration("1.5s"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_duration("-1s"), None);
        assert_eq!(parse_duration("abc"), None);
    }

    #[test]
    fn test_empty_script() {
        let script = Script::parse("# nothing here\n\n").unwrap();
        assert!(script.is_empty());
    }
}

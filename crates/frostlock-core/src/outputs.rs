//! Output enumeration.
//!
//! Asks the compositor which outputs are active. The default source shells
//! out to `swaymsg -t get_outputs --raw`.

use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// A display output as reported by the compositor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputDescriptor {
    /// Connector name, e.g. `eDP-1`.
    pub name: String,
}

impl OutputDescriptor {
    /// Create a descriptor for the named output.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl std::fmt::Display for OutputDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Something that can list the outputs to lock, in a stable order.
pub trait OutputSource {
    /// Query the active outputs.
    ///
    /// # Errors
    ///
    /// Returns an error if the compositor cannot be queried or its answer
    /// cannot be parsed.
    fn outputs(&self) -> Result<Vec<OutputDescriptor>>;
}

/// Output source backed by sway's IPC client.
#[derive(Debug, Clone)]
pub struct SwayOutputs {
    command: String,
}

impl SwayOutputs {
    /// Create a source that runs the given `swaymsg`-compatible command.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl OutputSource for SwayOutputs {
    fn outputs(&self) -> Result<Vec<OutputDescriptor>> {
        let output = Command::new(&self.command)
            .args(["-t", "get_outputs", "--raw"])
            .output()
            .map_err(|e| Error::OutputQuery {
                command: self.command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::OutputQuery {
                command: self.command.clone(),
                message: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let outputs = parse_outputs(&output.stdout)?;
        debug!(count = outputs.len(), "queried compositor outputs");
        Ok(outputs)
    }
}

/// Raw shape of one entry in `get_outputs`; every other field is ignored.
#[derive(Debug, Deserialize)]
struct RawOutput {
    name: String,
    #[serde(default)]
    active: Option<bool>,
}

/// Parse the JSON reply of `get_outputs`, dropping outputs that are
/// explicitly inactive.
///
/// # Errors
///
/// Returns [`Error::Json`] if the reply is not an array of objects with a
/// `name` field.
pub fn parse_outputs(json: &[u8]) -> Result<Vec<OutputDescriptor>> {
    let raw: Vec<RawOutput> = serde_json::from_slice(json)?;
    Ok(raw
        .into_iter()
        .filter(|o| o.active != Some(false))
        .map(|o| OutputDescriptor { name: o.name })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_outputs_keeps_order() {
        let json = br#"[{"name": "eDP-1"}, {"name": "DP-2"}, {"name": "HDMI-A-1"}]"#;
        let outputs = parse_outputs(json).unwrap();
        let names: Vec<_> = outputs.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["eDP-1", "DP-2", "HDMI-A-1"]);
    }

    #[test]
    fn test_parse_outputs_ignores_extra_fields() {
        let json = br#"[{
            "id": 3,
            "name": "DP-1",
            "make": "Dell Inc.",
            "active": true,
            "rect": {"x": 0, "y": 0, "width": 2560, "height": 1440},
            "modes": []
        }]"#;
        let outputs = parse_outputs(json).unwrap();
        assert_eq!(outputs, vec![OutputDescriptor::new("DP-1")]);
    }

    #[test]
    fn test_parse_outputs_skips_inactive() {
        let json = br#"[{"name": "eDP-1", "active": false}, {"name": "DP-1", "active": true}]"#;
        let outputs = parse_outputs(json).unwrap();
        assert_eq!(outputs, vec![OutputDescriptor::new("DP-1")]);
    }

    #[test]
    fn test_parse_outputs_empty_array() {
        assert!(parse_outputs(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_outputs_rejects_garbage() {
        assert!(matches!(parse_outputs(b"not json"), Err(Error::Json(_))));
        assert!(matches!(
            parse_outputs(br#"[{"id": 1}]"#),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_missing_command_is_output_query_error() {
        let source = SwayOutputs::new("/nonexistent/frostlock-swaymsg");
        let err = source.outputs().unwrap_err();
        assert!(matches!(err, Error::OutputQuery { .. }));
        assert!(err.to_string().contains("frostlock-swaymsg"));
    }

    #[test]
    fn test_output_descriptor_display() {
        assert_eq!(OutputDescriptor::new("eDP-1").to_string(), "eDP-1");
    }
}

use serde_yaml::Value;

/// Outcome of the opt-out check for a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Apply the default authorizer.
    Open,
    /// Leave the event untouched.
    Closed,
}

/// Reads the opt-out flag. Absent or `true` opens the gate, `false` closes
/// it, and any other value is handed back as the offending literal.
pub fn opt_out_gate(flag: Option<&Value>) -> Result<Gate, Value> {
    match flag {
        None | Some(Value::Bool(true)) => Ok(Gate::Open),
        Some(Value::Bool(false)) => Ok(Gate::Closed),
        Some(other) => Err(other.clone()),
    }
}

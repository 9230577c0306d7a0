// Command messages - Communication observer → HUD
// JSON shape: `{ "type": "...", "index"?: n, "target"?: "..." }`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HudCommand {
    /// Toggle play/stop
    Play,
    /// Start if stopped
    PlayOnly,
    /// Stop unconditionally
    StopOnly,
    Next,
    Prev,
    ToggleMetronome,
    Panic,
    /// Jump to a marker of the visible list
    JumpIndex { index: i64 },
    /// Jump to a marker by exact name
    Jump { target: String },
}

impl HudCommand {
    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transport_commands() {
        let cases = [
            (r#"{"type":"play"}"#, HudCommand::Play),
            (r#"{"type":"playOnly"}"#, HudCommand::PlayOnly),
            (r#"{"type":"stopOnly"}"#, HudCommand::StopOnly),
            (r#"{"type":"next"}"#, HudCommand::Next),
            (r#"{"type":"prev"}"#, HudCommand::Prev),
            (r#"{"type":"toggleMetronome"}"#, HudCommand::ToggleMetronome),
            (r#"{"type":"panic"}"#, HudCommand::Panic),
        ];

        for (json, expected) in cases {
            assert_eq!(HudCommand::from_json(json).unwrap(), expected);
        }
    }

    #[test]
    fn test_parse_jump_commands() {
        assert_eq!(
            HudCommand::from_json(r#"{"type":"jumpIndex","index":3}"#).unwrap(),
            HudCommand::JumpIndex { index: 3 }
        );
        assert_eq!(
            HudCommand::from_json(r##"{"type":"jump","target":"#2 -> Verse"}"##).unwrap(),
            HudCommand::Jump {
                target: "#2 -> Verse".into()
            }
        );
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        assert_eq!(
            HudCommand::from_json(r#"{"type":"play","index":2,"target":"x"}"#).unwrap(),
            HudCommand::Play
        );
    }

    #[test]
    fn test_malformed_commands_are_rejected() {
        assert!(HudCommand::from_json(r#"{"type":"rewind"}"#).is_err());
        assert!(HudCommand::from_json(r#"{"type":"jumpIndex"}"#).is_err());
        assert!(HudCommand::from_json(r#"{"index":1}"#).is_err());
        assert!(HudCommand::from_json("not json").is_err());
    }

    #[test]
    fn test_jump_index_must_be_an_integer() {
        assert!(HudCommand::from_json(r#"{"type":"jumpIndex","index":1.0}"#).is_err());
        assert!(HudCommand::from_json(r#"{"type":"jumpIndex","index":"1"}"#).is_err());
    }
}

// Broadcast messages - Communication HUD → observers

use crate::timeline::snapshot::TimelineSnapshot;
use serde::{Deserialize, Serialize};

/// Outbound message, serialized as `{ "event": "...", "data": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum Broadcast {
    /// Full timeline state
    Update(TimelineSnapshot),
    /// Visible marker names, sent only when the list changes
    CueList(Vec<String>),
}

impl Broadcast {
    /// Event name on the wire
    pub fn event_name(&self) -> &'static str {
        match self {
            Broadcast::Update(_) => "update",
            Broadcast::CueList(_) => "cueList",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_list_wire_format() {
        let message = Broadcast::CueList(vec!["A".into(), "B".into()]);
        assert_eq!(message.to_json().unwrap(), r#"{"event":"cueList","data":["A","B"]}"#);
        assert_eq!(message.event_name(), "cueList");
    }

    #[test]
    fn test_update_wire_format() {
        let message = Broadcast::Update(TimelineSnapshot::initial());
        let json: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();

        assert_eq!(json["event"], "update");
        assert_eq!(json["data"]["segmentTitle"], "ESPERANDO...");
        assert_eq!(json["data"]["beat"], 1);
    }

    #[test]
    fn test_decode_round_trip() {
        let message = Broadcast::Update(TimelineSnapshot::initial().with_playing(true));
        let decoded: Broadcast = serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(decoded, message);
    }
}

//! Control protocol - JSON command/response definitions

use serde::{Deserialize, Serialize};

/// Commands sent by a front-end to the control server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "params")]
pub enum ControlCommand {
    /// Health check
    Ping,
    /// Move the scene to a new instant (RFC 3339 or `YYYY-MM-DD`)
    SetDate { timestamp: String },
    /// Move the observer (degrees)
    SetObserver { latitude: f64, longitude: f64 },
    /// Get the current light placement
    GetLight,
    /// Get the current camera state
    GetCamera,
    /// Get the moon's illuminated fraction and phase
    GetIllumination,
    /// Viewport changed size
    Resize { width: u32, height: u32 },
    /// Get a summary of the scene
    GetSceneInfo,
}

impl ControlCommand {
    /// Wire name of the command, as it appears in the `cmd` field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ping => "Ping",
            Self::SetDate { .. } => "SetDate",
            Self::SetObserver { .. } => "SetObserver",
            Self::GetLight => "GetLight",
            Self::GetCamera => "GetCamera",
            Self::GetIllumination => "GetIllumination",
            Self::Resize { .. } => "Resize",
            Self::GetSceneInfo => "GetSceneInfo",
        }
    }
}

/// Responses from the control server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ControlResponse {
    #[serde(rename = "ok")]
    Ok { data: ResponseData },
    #[serde(rename = "error")]
    Error { message: String },
}

/// Response data variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    None,
    Pong { message: String },
    ParamsUpdated { description: String },
    LightState {
        position: [f64; 3],
        target: [f64; 3],
        direction: [f64; 3],
        distance: f64,
        source: String,
        source_altitude_degrees: f64,
        source_azimuth_degrees: f64,
    },
    CameraState {
        position: [f32; 3],
        forward: [f32; 3],
        fov_degrees: f32,
        aspect: f32,
    },
    Illumination {
        fraction: f64,
        phase: f64,
        angle: f64,
        phase_name: String,
    },
    SceneInfo {
        timestamp: String,
        latitude: f64,
        longitude: f64,
        model_loaded: bool,
        node_count: u32,
        moon_altitude_degrees: f64,
        moon_azimuth_degrees: f64,
    },
}

impl ControlResponse {
    pub fn ok(data: ResponseData) -> Self {
        Self::Ok { data }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error {
            message: msg.into(),
        }
    }

    pub fn pong() -> Self {
        Self::ok(ResponseData::Pong {
            message: "pong".into(),
        })
    }

    pub fn updated(description: impl Into<String>) -> Self {
        Self::ok(ResponseData::ParamsUpdated {
            description: description.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unit_command_wire_shape() {
        let json = serde_json::to_value(&ControlCommand::Ping).unwrap();
        assert_eq!(json, json!({"cmd": "Ping"}));

        let cmd: ControlCommand = serde_json::from_str(r#"{"cmd":"GetLight"}"#).unwrap();
        assert_eq!(cmd, ControlCommand::GetLight);
    }

    #[test]
    fn test_command_with_params() {
        let cmd: ControlCommand = serde_json::from_str(
            r#"{"cmd":"SetObserver","params":{"latitude":53.0,"longitude":-2.0}}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            ControlCommand::SetObserver { latitude: 53.0, longitude: -2.0 }
        );

        let json = serde_json::to_value(&ControlCommand::SetDate {
            timestamp: "2023-07-06".into(),
        })
        .unwrap();
        assert_eq!(json, json!({"cmd": "SetDate", "params": {"timestamp": "2023-07-06"}}));
    }

    #[test]
    fn test_name_matches_wire_tag() {
        let cmds = [
            ControlCommand::Ping,
            ControlCommand::SetDate { timestamp: "2024-01-25".into() },
            ControlCommand::Resize { width: 1, height: 1 },
            ControlCommand::GetSceneInfo,
        ];
        for cmd in cmds {
            let json = serde_json::to_value(&cmd).unwrap();
            assert_eq!(json["cmd"], cmd.name());
        }
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(serde_json::from_str::<ControlCommand>(r#"{"cmd":"Explode"}"#).is_err());
    }

    #[test]
    fn test_ok_response_shape() {
        let json = serde_json::to_value(&ControlResponse::pong()).unwrap();
        assert_eq!(json, json!({"status": "ok", "data": {"message": "pong"}}));
    }

    #[test]
    fn test_error_response_shape() {
        let json = serde_json::to_value(&ControlResponse::error("no model")).unwrap();
        assert_eq!(json, json!({"status": "error", "message": "no model"}));
    }

    #[test]
    fn test_light_state_round_trip() {
        let response = ControlResponse::ok(ResponseData::LightState {
            position: [-5.8, -1.5, 0.3],
            target: [0.0, 0.0, 0.0],
            direction: [-0.97, -0.24, 0.05],
            distance: 6.0,
            source: "sun".into(),
            source_altitude_degrees: -14.2,
            source_azimuth_degrees: 176.9,
        });
        let text = serde_json::to_string(&response).unwrap();
        let back: ControlResponse = serde_json::from_str(&text).unwrap();
        assert_eq!(back, response);
    }

    #[test]
    fn test_illumination_round_trip() {
        let response = ControlResponse::ok(ResponseData::Illumination {
            fraction: 0.91,
            phase: 0.59,
            angle: 1.2,
            phase_name: "waning gibbous".into(),
        });
        let text = serde_json::to_string(&response).unwrap();
        let back: ControlResponse = serde_json::from_str(&text).unwrap();
        assert_eq!(back, response);
    }
}

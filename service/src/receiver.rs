use serde::Deserialize;
use serde_json::Value;

pub const ACTION_CLICK: &str = "com.gesturebridge.CLICK";
pub const ACTION_SWIPE: &str = "com.gesturebridge.SWIPE";

pub const DEFAULT_CLICK_DURATION_MS: i64 = 100;
pub const DEFAULT_SWIPE_DURATION_MS: i64 = 300;

// Extras are looked up by name with intent semantics: a missing extra and an
// extra of the wrong type both yield the caller's default.
#[derive(Debug, Deserialize)]
pub struct Broadcast {
    pub action: String,
    #[serde(flatten)]
    extras: serde_json::Map<String, Value>,
}

impl Broadcast {
    pub fn float_extra(&self, name: &str, default: f32) -> f32 {
        self.extras
            .get(name)
            .and_then(Value::as_f64)
            .map(|v| v as f32)
            .unwrap_or(default)
    }

    pub fn int_extra(&self, name: &str, default: i64) -> i64 {
        self.extras
            .get(name)
            .and_then(Value::as_i64)
            .unwrap_or(default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickRequest {
    pub x: f32,
    pub y: f32,
    pub duration_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeRequest {
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
    pub duration_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureRequest {
    Click(ClickRequest),
    Swipe(SwipeRequest),
}

impl GestureRequest {
    pub fn from_broadcast(broadcast: &Broadcast) -> Option<Self> {
        match broadcast.action.as_str() {
            ACTION_CLICK => Some(Self::Click(ClickRequest {
                x: broadcast.float_extra("x", 0.0),
                y: broadcast.float_extra("y", 0.0),
                duration_ms: broadcast.int_extra("duration", DEFAULT_CLICK_DURATION_MS),
            })),
            ACTION_SWIPE => Some(Self::Swipe(SwipeRequest {
                start_x: broadcast.float_extra("start_x", 0.0),
                start_y: broadcast.float_extra("start_y", 0.0),
                end_x: broadcast.float_extra("end_x", 0.0),
                end_y: broadcast.float_extra("end_y", 0.0),
                duration_ms: broadcast.int_extra("duration", DEFAULT_SWIPE_DURATION_MS),
            })),
            _ => None,
        }
    }
}

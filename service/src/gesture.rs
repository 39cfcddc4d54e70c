use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokeDescription {
    pub path: Vec<PathPoint>,
    pub start_ms: i64,
    pub duration_ms: i64,
}

// The serialized JSON form is the contract with the Java bridge side; the
// platform interpolates along each stroke path, this side never does.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GestureDescription {
    pub strokes: Vec<StrokeDescription>,
}

impl StrokeDescription {
    pub fn press(x: f32, y: f32, duration_ms: i64) -> Self {
        Self {
            path: vec![PathPoint { x, y }],
            start_ms: 0,
            duration_ms,
        }
    }

    // A zero-length line is legal and keeps both points.
    pub fn line(x1: f32, y1: f32, x2: f32, y2: f32, duration_ms: i64) -> Self {
        Self {
            path: vec![PathPoint { x: x1, y: y1 }, PathPoint { x: x2, y: y2 }],
            start_ms: 0,
            duration_ms,
        }
    }
}

impl GestureDescription {
    pub fn tap(x: f32, y: f32, duration_ms: i64) -> Self {
        Self {
            strokes: vec![StrokeDescription::press(x, y, duration_ms)],
        }
    }

    pub fn line(x1: f32, y1: f32, x2: f32, y2: f32, duration_ms: i64) -> Self {
        Self {
            strokes: vec![StrokeDescription::line(x1, y1, x2, y2, duration_ms)],
        }
    }
}

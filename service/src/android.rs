use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, Mutex};

use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::{jboolean, jlong};
use jni::{JNIEnv, JavaVM};
use tokio::sync::oneshot;
use tracing::debug;

use crate::dispatch::{DispatchError, GestureDispatcher, GestureOutcome};
use crate::gesture::GestureDescription;

const BRIDGE_CLASS: &str = "com/gesturebridge/GestureBridge";
const CONNECT_ATTEMPTS: u32 = 30;

// Senders parked until the platform reports back through
// nativeOnGestureResult, which arrives on a JVM thread with no call context.
static IN_FLIGHT: LazyLock<Mutex<HashMap<u64, oneshot::Sender<GestureOutcome>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));
static NEXT_GESTURE_ID: AtomicU64 = AtomicU64::new(1);

// Gestures cross the boundary as JSON; results come back by gesture id
// through the exported native callback.
pub struct AccessibilityDispatcher {
    jvm: JavaVM,
    bridge: GlobalRef,
}

impl AccessibilityDispatcher {
    // The accessibility service may not be connected yet when the process
    // comes up, so construction retries for up to 30 seconds.
    pub fn connect(env: &mut JNIEnv) -> Result<Self, DispatchError> {
        let class = env
            .find_class(BRIDGE_CLASS)
            .map_err(|e| DispatchError::Bridge(format!("find {BRIDGE_CLASS} failed: {e}")))?;

        let mut bridge = None;
        for attempt in 0..CONNECT_ATTEMPTS {
            match env.new_object(&class, "()V", &[]) {
                Ok(obj) => {
                    bridge = Some(obj);
                    break;
                }
                Err(_) => {
                    if env.exception_check().unwrap_or(false) {
                        env.exception_clear().ok();
                    }
                    if attempt + 1 < CONNECT_ATTEMPTS {
                        std::thread::sleep(std::time::Duration::from_secs(1));
                    }
                }
            }
        }
        let bridge = bridge.ok_or_else(|| {
            DispatchError::Bridge("accessibility bridge did not come up".to_string())
        })?;

        let bridge = env
            .new_global_ref(&bridge)
            .map_err(|e| DispatchError::Bridge(format!("new_global_ref failed: {e}")))?;
        let jvm = env
            .get_java_vm()
            .map_err(|e| DispatchError::Bridge(format!("get_java_vm failed: {e}")))?;

        Ok(Self { jvm, bridge })
    }

    fn call_dispatch(&self, json: &str, id: u64) -> Result<bool, DispatchError> {
        let mut env = self
            .jvm
            .attach_current_thread()
            .map_err(|e| DispatchError::Bridge(format!("attach_current_thread failed: {e}")))?;
        let payload = env
            .new_string(json)
            .map_err(|e| DispatchError::Bridge(format!("new_string failed: {e}")))?;

        let bridge: &JObject = self.bridge.as_obj();
        let result = env.call_method(
            bridge,
            "dispatchGesture",
            "(Ljava/lang/String;J)Z",
            &[JValue::Object(&payload), JValue::Long(id as jlong)],
        );
        match result {
            Ok(value) => value
                .z()
                .map_err(|e| DispatchError::Bridge(format!("dispatchGesture result failed: {e}"))),
            Err(e) => {
                let detail = exception_text(&mut env).unwrap_or_else(|| e.to_string());
                Err(DispatchError::Bridge(format!(
                    "dispatchGesture call failed: {detail}"
                )))
            }
        }
    }
}

impl GestureDispatcher for AccessibilityDispatcher {
    fn dispatch(
        &self,
        gesture: GestureDescription,
    ) -> Result<oneshot::Receiver<GestureOutcome>, DispatchError> {
        let json = serde_json::to_string(&gesture)
            .map_err(|e| DispatchError::Bridge(format!("encode gesture failed: {e}")))?;
        let id = NEXT_GESTURE_ID.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        IN_FLIGHT.lock().unwrap().insert(id, tx);

        match self.call_dispatch(&json, id) {
            Ok(true) => Ok(rx),
            Ok(false) => {
                IN_FLIGHT.lock().unwrap().remove(&id);
                Err(DispatchError::Rejected)
            }
            Err(error) => {
                IN_FLIGHT.lock().unwrap().remove(&id);
                Err(error)
            }
        }
    }
}

fn exception_text(env: &mut JNIEnv) -> Option<String> {
    if !env.exception_check().unwrap_or(false) {
        return None;
    }
    let exc = env.exception_occurred().ok()?;
    env.exception_clear().ok();
    let text = env
        .call_method(&exc, "toString", "()Ljava/lang/String;", &[])
        .ok()?
        .l()
        .ok()?;
    let jstr: JString = text.into();
    env.get_string(&jstr).ok().map(|s| s.into())
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_gesturebridge_GestureBridge_nativeOnGestureResult(
    _env: JNIEnv,
    _class: JClass,
    id: jlong,
    completed: jboolean,
) {
    let outcome = if completed != 0 {
        GestureOutcome::Completed
    } else {
        GestureOutcome::Cancelled
    };
    match IN_FLIGHT.lock().unwrap().remove(&(id as u64)) {
        Some(tx) => {
            let _ = tx.send(outcome);
        }
        None => debug!(id, "gesture result for unknown id"),
    }
}

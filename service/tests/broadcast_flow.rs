use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use gesture_bridge::dispatch::{DispatchError, GestureDispatcher, GestureOutcome};
use gesture_bridge::gesture::GestureDescription;
use gesture_bridge::service::{GestureAdapter, GestureService, ServiceError};
use tokio::sync::oneshot;

#[derive(Default)]
struct RecordingDispatcher {
    gestures: Mutex<Vec<GestureDescription>>,
}

impl RecordingDispatcher {
    fn recorded(&self) -> Vec<GestureDescription> {
        self.gestures.lock().unwrap().clone()
    }
}

impl GestureDispatcher for RecordingDispatcher {
    fn dispatch(
        &self,
        gesture: GestureDescription,
    ) -> Result<oneshot::Receiver<GestureOutcome>, DispatchError> {
        self.gestures.lock().unwrap().push(gesture);
        let (tx, rx) = oneshot::channel();
        tx.send(GestureOutcome::Completed).unwrap();
        Ok(rx)
    }
}

async fn start_service() -> (GestureService, Arc<RecordingDispatcher>) {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let adapter = GestureAdapter::new(dispatcher.clone());
    let service = GestureService::bind(SocketAddr::from(([127, 0, 0, 1], 0)), adapter)
        .await
        .unwrap();
    (service, dispatcher)
}

fn broadcast_url(addr: SocketAddr) -> String {
    format!("http://{addr}/broadcast")
}

#[tokio::test]
async fn broadcasts_drive_the_platform_dispatcher() {
    let (service, dispatcher) = start_service().await;
    let url = broadcast_url(service.local_addr());
    let client = reqwest::Client::new();

    let resp = client
        .post(&url)
        .json(&serde_json::json!({
            "action": "com.gesturebridge.CLICK",
            "x": 120.5,
            "y": 88.0,
            "duration": 40
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(&url)
        .json(&serde_json::json!({
            "action": "com.gesturebridge.SWIPE",
            "start_x": 10.0,
            "start_y": 20.0,
            "end_x": 400.0,
            "end_y": 900.0,
            "duration": 250
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    assert_eq!(
        dispatcher.recorded(),
        vec![
            GestureDescription::tap(120.5, 88.0, 40),
            GestureDescription::line(10.0, 20.0, 400.0, 900.0, 250),
        ]
    );

    drop(client);
    service.shutdown().await;
}

#[tokio::test]
async fn shutdown_stops_accepting_broadcasts() {
    let (service, dispatcher) = start_service().await;
    let addr = service.local_addr();
    let client = reqwest::Client::new();

    client
        .post(broadcast_url(addr))
        .json(&serde_json::json!({ "action": "com.gesturebridge.CLICK" }))
        .send()
        .await
        .unwrap();
    assert_eq!(dispatcher.recorded().len(), 1);

    drop(client);
    service.shutdown().await;

    let late = reqwest::Client::new()
        .post(broadcast_url(addr))
        .json(&serde_json::json!({ "action": "com.gesturebridge.CLICK" }))
        .send()
        .await;
    assert!(late.is_err());
    assert_eq!(dispatcher.recorded().len(), 1);
}

#[tokio::test]
async fn adapter_is_directly_callable_on_a_bound_service() {
    let (service, dispatcher) = start_service().await;

    service.adapter().perform_click(33.0, 44.0, 100);
    assert_eq!(
        dispatcher.recorded(),
        vec![GestureDescription::tap(33.0, 44.0, 100)]
    );

    service.shutdown().await;
}

#[tokio::test]
async fn port_can_be_rebound_after_shutdown() {
    let (service, _) = start_service().await;
    let addr = service.local_addr();
    service.shutdown().await;

    let dispatcher = Arc::new(RecordingDispatcher::default());
    let service = GestureService::bind(addr, GestureAdapter::new(dispatcher))
        .await
        .unwrap();
    assert_eq!(service.local_addr(), addr);
    service.shutdown().await;
}

#[tokio::test]
async fn second_instance_cannot_share_the_port() {
    let (service, _) = start_service().await;
    let addr = service.local_addr();

    let dispatcher = Arc::new(RecordingDispatcher::default());
    let result = GestureService::bind(addr, GestureAdapter::new(dispatcher)).await;
    assert!(matches!(result, Err(ServiceError::Bind { .. })));

    service.shutdown().await;
}

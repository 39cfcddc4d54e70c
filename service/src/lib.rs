use std::net::SocketAddr;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::sync::Arc;

use jni::objects::{JClass, JObjectArray};
use jni::JNIEnv;

pub mod android;
pub mod config;
pub mod dispatch;
pub mod gesture;
pub mod receiver;
pub mod service;

use android::AccessibilityDispatcher;
use config::Settings;
use service::{GestureAdapter, GestureService};

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_gesturebridge_Main_nativeRun(
    mut env: JNIEnv,
    _class: JClass,
    _java_args: JObjectArray,
) {
    let is_daemon = std::env::var(config::DAEMON_ENV).is_ok();

    if !is_daemon {
        // Parent: spawn the detached daemon child, then return to the shell.
        let mut cmd = Command::new("app_process");
        cmd.arg0("gesture-bridge")
            .args(["/system/bin", "com.gesturebridge.Main"])
            .env(config::DAEMON_ENV, "1")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        unsafe {
            cmd.pre_exec(|| {
                libc::setsid();
                Ok(())
            });
        }
        cmd.spawn().expect("spawn daemon");
        return;
    }

    let settings = Settings::from_env();

    if let Some(dir) = settings.log_path.parent() {
        std::fs::create_dir_all(dir).expect("create log dir");
    }
    let log_file = std::fs::File::create(&settings.log_path).expect("create log file");
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    tracing::info!(port = settings.port, "starting gesture bridge");

    let dispatcher =
        AccessibilityDispatcher::connect(&mut env).expect("connect accessibility bridge");
    tracing::info!("accessibility bridge connected");

    let adapter = GestureAdapter::new(Arc::new(dispatcher));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build tokio runtime");

    runtime.block_on(async move {
        let addr = SocketAddr::from(([127, 0, 0, 1], settings.port));
        let service = GestureService::bind(addr, adapter)
            .await
            .expect("bind gesture service");

        wait_for_stop_signal().await;
        service.shutdown().await;
    });
}

async fn wait_for_stop_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
    let mut int = signal(SignalKind::interrupt()).expect("install SIGINT handler");
    tokio::select! {
        _ = term.recv() => tracing::info!("termination requested"),
        _ = int.recv() => tracing::info!("interrupted"),
    }
}

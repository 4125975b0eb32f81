use anyhow::Result;
use api::DetectionSource;
use common::config::load_config;
use common::{
    AppConfig, CalibrationManager, PoseSignalAdapter, RetargetSession, SamplingThrottle,
    ViewportProjector,
};
use log::{debug, error, info, trace, warn};
use parallax_d::control::{get_router, ControlHost};
use parallax_d::outputs::{create_backend, Dispatcher};
use parallax_d::sources::create_source;
use parallax_d::DaemonState;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const IDLE_SLEEP: Duration = Duration::from_millis(5);
const SEND_WARN_INTERVAL: Duration = Duration::from_secs(5);

fn spawn_sampling_thread(
    state: DaemonState,
    mut source: Box<dyn DetectionSource>,
    mut adapter: PoseSignalAdapter,
    interval: Duration,
    running: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        info!("Sampling thread started ({:?} interval)", interval);
        let mut throttle = SamplingThrottle::new(interval);
        let mut detections: u64 = 0;

        while running.load(Ordering::SeqCst) {
            let now = Instant::now();
            if !throttle.try_acquire(now) {
                thread::sleep(throttle.remaining(now).min(IDLE_SLEEP));
                continue;
            }

            let requests = state.take_requests();
            if let Some(mode) = requests.mode {
                adapter.set_mode(mode);
                *state.mode.write().unwrap_or_else(|e| e.into_inner()) = mode;
            }

            match source.poll() {
                Ok(Some(detection)) => {
                    let pose = adapter.update(Some(&detection));
                    state.pose.publish(pose);
                    detections += 1;
                    trace!("Pose {:?}", pose);
                }
                Ok(None) => {}
                Err(e) => warn!("Detection poll failed: {}", e),
            }

            if requests.calibrate_distance {
                adapter.calibrate_distance();
            }
        }

        source.unload();
        info!("Sampling thread stopped after {} detections", detections);
    })
}

fn spawn_control_thread(state: DaemonState, config: &AppConfig) {
    let port = config.control.port;
    let advertise = config.control.advertise_mdns;

    thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                error!("Failed to create Tokio runtime: {}", e);
                return;
            }
        };
        rt.block_on(async {
            if let Err(e) = ControlHost::start(port, get_router(state), advertise).await {
                error!("Control server failed: {}", e);
            }
        });
    });
}

fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    info!("Starting...");
    debug!("Debug logging is active");
    trace!("Trace logging is active");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        info!("Received Ctrl-C, shutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    let config_path = Path::new("config.json");
    let config = load_config(config_path).unwrap_or_else(|e| {
        error!("Failed to load config: {:#}. Using defaults.", e);
        AppConfig::default()
    });
    info!("Loaded Config: {:?}", config);

    let storage_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let mut calibration = CalibrationManager::new(storage_dir, config.calibration.preset);
    calibration.profile = config.calibration.initial_profile();
    if let Err(e) = calibration.load() {
        error!("Failed to load calibration: {:#}", e);
    }

    let state = DaemonState::new(
        calibration,
        config.tracking.mode,
        RetargetSession::new(config.retarget.clone()),
    );

    let mut dispatcher = Dispatcher::new(create_backend(&config.output));
    if let Err(e) = dispatcher.initialize() {
        error!("Failed to initialize camera output: {}", e);
        return Err(e);
    }
    info!("Camera output initialized with {:?} backend.", config.output.mode);

    spawn_control_thread(state.clone(), &config);

    let mut source = create_source(&config.tracking.source);
    if let Err(e) = source.initialize() {
        error!("Failed to initialize detection source: {:#}", e);
        return Err(e);
    }
    let adapter = PoseSignalAdapter::new(config.tracking.mode, &config.tracking.target_category);
    let sampler = spawn_sampling_thread(
        state.clone(),
        source,
        adapter,
        Duration::from_millis(config.tracking.sampling_interval_ms),
        running.clone(),
    );

    info!("Entering Render Loop...");

    let mut projector = ViewportProjector::new(&state.profile())
        .with_smoothing_reference(config.render.smoothing_reference_hz);
    let target_frame_duration = Duration::from_secs_f32(1.0 / config.render.fps);

    let mut frame_count: u64 = 0;
    let mut log_interval: u64 = 1000;
    let mut last_log = Instant::now();
    let mut last_frame_time = Instant::now();
    let mut last_send_warn: Option<Instant> = None;

    while running.load(Ordering::SeqCst) {
        let tick_start = Instant::now();
        let dt = tick_start.duration_since(last_frame_time).as_secs_f32();
        last_frame_time = tick_start;

        let profile = state.profile();
        let pose = state.pose.latest();
        let frame = projector.project_with_dt(&pose, &profile, dt);
        *state.camera.write().unwrap_or_else(|e| e.into_inner()) = Some(frame);

        if let Err(e) = dispatcher.send(&frame) {
            let should_log = last_send_warn.map_or(true, |t| t.elapsed() >= SEND_WARN_INTERVAL);
            if should_log {
                warn!("Failed to send camera frame: {}", e);
                last_send_warn = Some(Instant::now());
            }
        }

        frame_count += 1;
        if frame_count % log_interval == 0 {
            let elapsed = last_log.elapsed().as_secs_f32();
            let fps = log_interval as f32 / elapsed;
            info!(
                "Rendering: {} frames (approx {:.1} FPS), {} sent",
                frame_count,
                fps,
                dispatcher.frames_sent()
            );
            last_log = Instant::now();

            if frame_count >= 1_000_000 {
                log_interval = 1_000_000;
            } else if frame_count >= 100_000 {
                log_interval = 100_000;
            } else if frame_count >= 10_000 {
                log_interval = 10_000;
            }
        }

        let elapsed = tick_start.elapsed();
        if elapsed < target_frame_duration {
            thread::sleep(target_frame_duration - elapsed);
        }
    }

    info!("Shutting down...");
    if sampler.join().is_err() {
        error!("Sampling thread panicked");
    }
    Ok(())
}

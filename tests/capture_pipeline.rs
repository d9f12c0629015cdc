use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};

use helmet_watch::alerts::{AlertLog, MULTIPLE_RIDERS_ALERT, NO_HELMET_ALERT};
use helmet_watch::overlay::DrawOp;
use helmet_watch::{
    BoundingBox, CameraConfig, CameraSource, CaptureLoop, Detection, DetectorBackend, Frame,
    FrameSource, FrameTicker, ImageSurface, LoopControl, RecordingSurface, StubBackend, Surface,
};

struct TestCamera {
    width: u32,
    height: u32,
    captured: u64,
}

impl TestCamera {
    fn vga() -> Option<Self> {
        Some(Self {
            width: 640,
            height: 480,
            captured: 0,
        })
    }
}

impl FrameSource for TestCamera {
    fn next_frame(&mut self) -> Result<Frame> {
        self.captured += 1;
        let pixels = vec![90u8; (self.width * self.height * 3) as usize];
        Frame::new(pixels, self.width, self.height, self.captured)
    }
}

/// Fails on the given call (1-based); counts every call.
struct FlakyDetector {
    fail_on: usize,
    calls: Arc<AtomicUsize>,
    inner: StubBackend,
}

impl DetectorBackend for FlakyDetector {
    fn name(&self) -> &'static str {
        "flaky"
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(anyhow!("inference backend crashed"));
        }
        self.inner.detect(frame)
    }
}

fn det(label: &str, confidence: f32, x: f32, y: f32, w: f32, h: f32) -> Detection {
    Detection::new(label, confidence, BoundingBox::new(x, y, w, h))
}

fn person() -> Detection {
    det("person", 0.9, 100.0, 120.0, 80.0, 200.0)
}

fn helmet() -> Detection {
    det("helmet", 0.8, 110.0, 90.0, 50.0, 40.0)
}

#[test]
fn single_person_is_boxed_and_labelled() {
    let detector = StubBackend::scripted(vec![vec![det("person", 0.9, 10.0, 20.0, 30.0, 40.0)]]);
    let mut capture = CaptureLoop::new(TestCamera::vga(), detector, RecordingSurface::new());
    let mut log = AlertLog::new();

    let report = capture.step(&mut log).unwrap();

    assert_eq!(
        capture.surface().rects(),
        vec![BoundingBox::new(10.0, 20.0, 30.0, 40.0)]
    );
    assert_eq!(
        capture.surface().texts(),
        vec![("person (90%)".to_string(), 10.0, 15.0)]
    );
    assert_eq!(report.counts.person_count, 1);
    assert_eq!(log.messages(), vec![NO_HELMET_ALERT]);
}

#[test]
fn every_detection_is_drawn_but_only_person_and_helmet_count() {
    let detector = StubBackend::scripted(vec![vec![
        det("motorcycle", 0.7, 200.0, 300.0, 150.0, 100.0),
        det("helmet", 0.66, 5.0, 5.0, 20.0, 20.0),
        det("car", 0.55, 400.0, 200.0, 100.0, 60.0),
    ]]);
    let mut capture = CaptureLoop::new(TestCamera::vga(), detector, RecordingSurface::new());
    let mut log = AlertLog::new();

    let report = capture.step(&mut log).unwrap();

    assert_eq!(capture.surface().rects().len(), 3);
    let labels: Vec<String> = capture
        .surface()
        .texts()
        .into_iter()
        .map(|(text, _, _)| text)
        .collect();
    assert_eq!(labels, vec!["motorcycle (70%)", "helmet (66%)", "car (55%)"]);
    assert_eq!(report.counts.person_count, 0);
    assert_eq!(report.counts.helmet_count, 1);
    assert!(log.is_empty());
}

#[test]
fn log_grows_by_each_frames_alerts_in_order() {
    let script = vec![
        vec![person()],
        vec![person(), person()],
        vec![person(), helmet()],
        vec![],
        vec![person(), helmet(), person()],
        vec![det("car", 0.9, 0.0, 50.0, 10.0, 10.0)],
    ];
    let mut capture = CaptureLoop::new(
        TestCamera::vga(),
        StubBackend::scripted(script),
        RecordingSurface::new(),
    )
    .with_ticker(FrameTicker::unpaced())
    .with_frame_limit(6);

    let mut per_frame = Vec::new();
    let mut log = AlertLog::new();
    let steps = capture
        .run_with(&LoopControl::new(), &mut log, |report| {
            per_frame.push(report.alerts.len())
        })
        .unwrap();

    assert_eq!(steps, 6);
    assert_eq!(per_frame, vec![1, 2, 0, 0, 1, 0]);
    assert_eq!(log.len(), per_frame.iter().sum::<usize>());
    assert_eq!(
        log.messages(),
        vec![
            NO_HELMET_ALERT,
            MULTIPLE_RIDERS_ALERT,
            NO_HELMET_ALERT,
            MULTIPLE_RIDERS_ALERT,
        ]
    );
}

#[test]
fn repeated_frames_are_not_deduplicated() {
    let mut capture = CaptureLoop::new(
        TestCamera::vga(),
        StubBackend::scripted(vec![vec![person()]]),
        RecordingSurface::new(),
    )
    .with_ticker(FrameTicker::unpaced())
    .with_frame_limit(3);
    let mut log = AlertLog::new();

    capture.run(&LoopControl::new(), &mut log).unwrap();
    assert_eq!(log.messages(), vec![NO_HELMET_ALERT; 3]);
}

#[test]
fn detector_failure_stops_run_without_alerting() {
    let calls = Arc::new(AtomicUsize::new(0));
    let detector = FlakyDetector {
        fail_on: 2,
        calls: Arc::clone(&calls),
        inner: StubBackend::scripted(vec![vec![helmet()], vec![person()]]),
    };
    let mut capture = CaptureLoop::new(TestCamera::vga(), detector, RecordingSurface::new())
        .with_ticker(FrameTicker::unpaced())
        .with_frame_limit(10);
    let mut log = AlertLog::new();

    let err = capture.run(&LoopControl::new(), &mut log).unwrap_err();

    assert!(format!("{:#}", err).contains("inference backend crashed"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(capture.frames_processed(), 1);
    assert!(log.is_empty());
}

#[test]
fn missing_camera_leaves_surface_blank() {
    let mut capture: CaptureLoop<TestCamera, _, _> =
        CaptureLoop::new(None, StubBackend::scripted(vec![vec![person()]]), ImageSurface::new())
            .with_ticker(FrameTicker::unpaced())
            .with_frame_limit(3);
    let mut log = AlertLog::new();

    let steps = capture.run(&LoopControl::new(), &mut log).unwrap();

    assert_eq!(steps, 3);
    assert!(!capture.has_source());
    assert!(capture.surface().is_blank());
    assert_eq!(capture.detector().calls(), 0);
    assert!(log.is_empty());
}

#[test]
fn frames_are_drawn_onto_the_image_surface() {
    let detector = StubBackend::scripted(vec![vec![person()]]);
    let mut capture = CaptureLoop::new(TestCamera::vga(), detector, ImageSurface::new());
    capture.step(&mut AlertLog::new()).unwrap();

    let canvas = capture.surface().canvas();
    assert_eq!(canvas.dimensions(), (640, 480));
    assert_eq!(canvas.get_pixel(0, 0).0, [90, 90, 90]);
    assert_eq!(canvas.get_pixel(100, 120).0, [255, 0, 0]);
}

#[test]
fn stub_camera_feeds_the_loop() {
    let camera = CameraSource::open(CameraConfig::default()).unwrap();
    let mut capture = CaptureLoop::new(Some(camera), StubBackend::demo(), RecordingSurface::new())
        .with_ticker(FrameTicker::unpaced())
        .with_frame_limit(4);
    let mut log = AlertLog::new();

    capture.run(&LoopControl::new(), &mut log).unwrap();

    assert_eq!(capture.source().unwrap().stats().frames_captured, 4);
    assert_eq!(log.messages(), vec![NO_HELMET_ALERT, MULTIPLE_RIDERS_ALERT]);
    let frames = capture
        .surface()
        .ops()
        .iter()
        .filter(|op| matches!(op, DrawOp::Frame { .. }))
        .count();
    assert_eq!(frames, 4);
}

#[test]
fn pause_suppresses_processing_and_stop_ends_run() {
    let calls = Arc::new(AtomicUsize::new(0));
    let detector = FlakyDetector {
        fail_on: usize::MAX,
        calls: Arc::clone(&calls),
        inner: StubBackend::scripted(vec![vec![person()]]),
    };
    let mut capture = CaptureLoop::new(TestCamera::vga(), detector, RecordingSurface::new())
        .with_ticker(FrameTicker::new(200));

    let control = LoopControl::new();
    control.pause();
    let worker_control = control.clone();
    let worker = std::thread::spawn(move || {
        let mut log = AlertLog::new();
        let steps = capture.run(&worker_control, &mut log);
        (steps, log)
    });

    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    control.resume();
    let deadline = Instant::now() + Duration::from_secs(5);
    while calls.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    control.stop();

    let (steps, log) = worker.join().unwrap();
    let steps = steps.unwrap();
    assert!(steps >= 1);
    assert_eq!(steps as usize, calls.load(Ordering::SeqCst));
    assert_eq!(log.len(), steps as usize);
}

#[test]
fn surface_has_fixed_resolution() {
    let surface = RecordingSurface::new();
    assert_eq!((surface.width(), surface.height()), (640, 480));
}

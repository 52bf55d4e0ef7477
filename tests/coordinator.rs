//! End-to-end lifecycle of the coordinator with in-memory providers and workers.

use std::future::Future;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use botvisor::{
    AiBackend, BackendError, CharacterFile, Coordinator, Event, EventKind, Generation,
    ModelProvider, ModelRef, Outcome, Phase, RuntimeError, Settings, StopReason, Subscribe,
    SupervisorConfig, TextModel, TunedModelInfo, Worker, WorkerError, WorkerLauncher,
};

struct Canned(Option<String>);

#[async_trait]
impl TextModel for Canned {
    async fn generate_content(&self, prompt: &str) -> Result<Generation, BackendError> {
        Ok(Generation {
            text: format!("{}: {prompt}", self.0.as_deref().unwrap_or("plain")),
        })
    }
}

#[derive(Default)]
struct Provider {
    broken: bool,
    slow_catalogue: bool,
}

#[async_trait]
impl ModelProvider for Provider {
    async fn list_tuned_models(&self) -> Result<Vec<String>, BackendError> {
        if self.slow_catalogue {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(vec!["tunedModels/other-model".into()])
    }

    async fn get_tuned_model(&self, name: &str) -> Result<TunedModelInfo, BackendError> {
        Err(BackendError::NotFound(name.into()))
    }

    fn open_model(&self, name: &str, instr: Option<&str>) -> Result<ModelRef, BackendError> {
        if self.broken {
            return Err(BackendError::Provider(format!("{name}: quota exceeded")));
        }
        Ok(Arc::new(Canned(instr.map(str::to_string))))
    }
}

/// Workers block until `kill()`; builds can be made to fail.
#[derive(Default)]
struct Bots {
    builds: AtomicUsize,
    fail_builds: AtomicBool,
    gates: Mutex<Vec<mpsc::Sender<()>>>,
    backends: Mutex<Vec<String>>,
}

struct Gated(mpsc::Receiver<()>);

impl Worker for Gated {
    fn start(&mut self) -> Result<(), WorkerError> {
        let _ = self.0.recv();
        Ok(())
    }
}

impl Bots {
    fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    fn kill(&self) {
        for gate in self.gates.lock().unwrap().drain(..) {
            let _ = gate.send(());
        }
    }
}

impl WorkerLauncher for Bots {
    fn name(&self) -> &str {
        "bot"
    }

    fn build(
        &self,
        _settings: &Settings,
        backend: Arc<AiBackend>,
    ) -> Result<Box<dyn Worker>, WorkerError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if self.fail_builds.load(Ordering::SeqCst) {
            return Err(WorkerError::Build("bot config rejected".into()));
        }
        self.backends.lock().unwrap().push(backend.to_string());
        let (tx, rx) = mpsc::channel();
        self.gates.lock().unwrap().push(tx);
        Ok(Box::new(Gated(rx)))
    }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<Event>>);

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.0.lock().unwrap().push(event.clone());
    }

    fn name(&self) -> &'static str {
        "Recorder"
    }
}

impl Recorder {
    fn kinds(&self) -> Vec<EventKind> {
        self.0.lock().unwrap().iter().map(|e| e.kind).collect()
    }
}

fn fast() -> SupervisorConfig {
    SupervisorConfig {
        poll_interval: Duration::from_millis(10),
        ..SupervisorConfig::default()
    }
}

fn no_characters() -> Arc<CharacterFile> {
    Arc::new(CharacterFile::new("/nonexistent/characters.json"))
}

async fn eventually<F, Fut>(mut probe: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !probe().await {
        assert!(tokio::time::Instant::now() < deadline, "condition not reached");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn zero_ready_workers_goes_idle() {
    let settings = Settings {
        enable_twitter: false,
        ..Settings::default()
    };
    let twitter = botvisor::TwitterLauncher::new(|_, _| {
        Err(WorkerError::Build("must not be built while disabled".into()))
    });
    let recorder = Arc::new(Recorder::default());

    let coordinator = Coordinator::builder(Arc::new(Provider::default()), no_characters())
        .with_settings(settings)
        .with_config(fast())
        .with_launcher(Arc::new(twitter))
        .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
        .build();
    let phase = coordinator.phase();

    let outcome = coordinator.run(std::future::pending()).await.unwrap();

    assert_eq!(outcome, Outcome::Idle);
    assert_eq!(*phase.borrow(), Phase::Idle);
    assert_eq!(
        recorder.kinds(),
        vec![EventKind::BackendResolved, EventKind::WorkerSkipped]
    );
}

#[tokio::test]
async fn one_ready_worker_is_monitored_until_stop() {
    let bots = Arc::new(Bots::default());
    let coordinator = Coordinator::builder(Arc::new(Provider::default()), no_characters())
        .with_config(fast())
        .with_launcher(bots.clone())
        .build();
    let mut phase = coordinator.phase();
    let alive = coordinator.alive();

    let stop = CancellationToken::new();
    let trigger = stop.clone();
    let run = tokio::spawn(coordinator.run(async move {
        trigger.cancelled().await;
        Ok(())
    }));

    phase.wait_for(|p| *p == Phase::Monitoring).await.unwrap();
    eventually(|| {
        let alive = alive.clone();
        async move { alive.snapshot().await == vec!["bot"] }
    })
    .await;
    assert_eq!(bots.builds(), 1);
    assert_eq!(
        *bots.backends.lock().unwrap(),
        vec!["default gemini-1.5-flash"]
    );

    stop.cancel();
    let outcome = run.await.unwrap().unwrap();
    assert_eq!(
        outcome,
        Outcome::Stopped {
            reason: StopReason::Signal,
            detached: vec!["bot".into()],
        }
    );
    assert_eq!(*phase.borrow(), Phase::Stopped);
    bots.kill();
}

#[tokio::test]
async fn dead_worker_gets_a_fresh_record() {
    let bots = Arc::new(Bots::default());
    let recorder = Arc::new(Recorder::default());
    let coordinator = Coordinator::builder(Arc::new(Provider::default()), no_characters())
        .with_config(fast())
        .with_launcher(bots.clone())
        .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
        .build();
    let mut phase = coordinator.phase();

    let stop = CancellationToken::new();
    let trigger = stop.clone();
    let run = tokio::spawn(coordinator.run(async move {
        trigger.cancelled().await;
        Ok(())
    }));
    phase.wait_for(|p| *p == Phase::Monitoring).await.unwrap();

    bots.kill();
    eventually(|| {
        let bots = bots.clone();
        async move { bots.builds() == 2 }
    })
    .await;

    stop.cancel();
    let outcome = run.await.unwrap().unwrap();
    assert_eq!(
        outcome,
        Outcome::Stopped {
            reason: StopReason::Signal,
            detached: vec!["bot".into()],
        }
    );

    let events = recorder.0.lock().unwrap().clone();
    let died = events
        .iter()
        .find(|e| e.kind == EventKind::WorkerDied)
        .expect("death observed");
    let restarted = events
        .iter()
        .find(|e| e.kind == EventKind::WorkerRestarted)
        .expect("restart observed");
    assert!(died.seq < restarted.seq);
    assert_eq!(died.generation, Some(1));
    assert_eq!(restarted.generation, Some(2));
    assert!(!recorder.kinds().contains(&EventKind::WorkerLost));
    bots.kill();
}

#[tokio::test]
async fn failed_restart_empties_the_set_and_ends_the_run() {
    let bots = Arc::new(Bots::default());
    let recorder = Arc::new(Recorder::default());
    let coordinator = Coordinator::builder(Arc::new(Provider::default()), no_characters())
        .with_config(fast())
        .with_launcher(bots.clone())
        .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
        .build();
    let mut phase = coordinator.phase();
    let alive = coordinator.alive();

    let run = tokio::spawn(coordinator.run(std::future::pending()));
    phase.wait_for(|p| *p == Phase::Monitoring).await.unwrap();

    bots.fail_builds.store(true, Ordering::SeqCst);
    bots.kill();

    let outcome = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("run ends without a stop request")
        .unwrap()
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Stopped {
            reason: StopReason::NoWorkersLeft,
            detached: Vec::new(),
        }
    );
    assert_eq!(bots.builds(), 2);
    assert!(alive.snapshot().await.is_empty());

    let kinds = recorder.kinds();
    assert!(kinds.contains(&EventKind::WorkerLost));
    assert!(kinds.contains(&EventKind::NoWorkersLeft));
    assert!(!kinds.contains(&EventKind::ShutdownRequested));
    assert_eq!(kinds.last(), Some(&EventKind::ShutdownCompleted));
}

#[tokio::test]
async fn no_backend_is_fatal() {
    let bots = Arc::new(Bots::default());
    let provider = Provider {
        broken: true,
        ..Provider::default()
    };
    let coordinator = Coordinator::builder(Arc::new(provider), no_characters())
        .with_launcher(bots.clone())
        .build();
    let phase = coordinator.phase();

    let err = coordinator.run(std::future::pending()).await.unwrap_err();

    assert!(matches!(err, RuntimeError::NoBackend { .. }));
    assert_eq!(*phase.borrow(), Phase::Fatal);
    assert_eq!(bots.builds(), 0);
}

#[tokio::test]
async fn stop_during_backend_resolution_ends_the_run() {
    let settings = Settings {
        tuned_model_name: Some("my-model".into()),
        ..Settings::default()
    };
    let provider = Provider {
        slow_catalogue: true,
        ..Provider::default()
    };
    let bots = Arc::new(Bots::default());
    let recorder = Arc::new(Recorder::default());
    let coordinator = Coordinator::builder(Arc::new(provider), no_characters())
        .with_settings(settings)
        .with_config(fast())
        .with_launcher(bots.clone())
        .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
        .build();
    let phase = coordinator.phase();

    let outcome = tokio::time::timeout(Duration::from_secs(5), coordinator.run(async { Ok(()) }))
        .await
        .expect("stop is honoured while the catalogue is still loading")
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Stopped {
            reason: StopReason::Signal,
            detached: Vec::new(),
        }
    );
    assert_eq!(*phase.borrow(), Phase::Stopped);
    assert_eq!(bots.builds(), 0);
    assert_eq!(recorder.kinds(), vec![EventKind::ShutdownRequested]);
}

#[tokio::test]
async fn workers_share_the_character_backend() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"characters":[
            {{"character_name":"Elf","character_detail":{{"text":"You are an elf."}}}},
            {{"character_name":"Reindeer","character_detail":{{"text":"You are a reindeer."}}}}
        ]}}"#
    )
    .unwrap();

    let settings = Settings {
        tuned_model_name: Some("my-model".into()),
        default_character: "Reindeer".into(),
        ..Settings::default()
    };
    let bots = Arc::new(Bots::default());
    let coordinator = Coordinator::builder(
        Arc::new(Provider::default()),
        Arc::new(CharacterFile::new(file.path())),
    )
    .with_settings(settings)
    .with_config(fast())
    .with_launcher(bots.clone())
    .build();
    let mut phase = coordinator.phase();

    let stop = CancellationToken::new();
    let trigger = stop.clone();
    let run = tokio::spawn(coordinator.run(async move {
        trigger.cancelled().await;
        Ok(())
    }));
    phase.wait_for(|p| *p == Phase::Monitoring).await.unwrap();

    assert_eq!(
        *bots.backends.lock().unwrap(),
        vec!["character gemini-1.5-flash (Reindeer)"]
    );

    stop.cancel();
    run.await.unwrap().unwrap();
    bots.kill();
}

use callfsm::config::Config;
use callfsm::domain::call::ReleaseOrigin;
use callfsm::domain::call_log::CallHistory;
use callfsm::domain::ports::{MediaProxy, Orchestrator, SignalingProxy, SignalingProxyFactory, Tone};
use callfsm::domain::timer::TimerKind;
use callfsm::infrastructure::TokioTimerFactory;
use callfsm::{spawn_session, SessionDeps, SessionId};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Orchestrator that only logs its hooks
struct LoggingOrchestrator;

impl Orchestrator for LoggingOrchestrator {
    fn update_gui(&self, session: SessionId) {
        info!("[orchestrator] refresh views for session {}", session);
    }

    fn destroy_session(&self, session: SessionId) {
        info!("[orchestrator] slot {} released", session);
    }

    fn activate_pending_action(&self) {
        info!("[orchestrator] no pending action");
    }
}

struct LoggingSignaling {
    session: AtomicI32,
}

impl LoggingSignaling {
    fn log(&self, what: &str) {
        info!("[signaling {}] {}", self.session.load(Ordering::SeqCst), what);
    }
}

impl SignalingProxy for LoggingSignaling {
    fn session_id(&self) -> SessionId {
        SessionId::new(self.session.load(Ordering::SeqCst))
    }

    fn set_session_id(&self, session: SessionId) {
        self.session.store(session.as_i32(), Ordering::SeqCst);
    }

    fn setup(&self, number: &str, name: &str) {
        self.log(&format!("SETUP {} <{}>", number, name));
    }

    fn alerting(&self) {
        self.log("ALERTING");
    }

    fn connect(&self) {
        self.log("CONNECT");
    }

    fn reject(&self) {
        self.log("REJECT");
    }

    fn release(&self) {
        self.log("RELEASE");
    }

    fn hold(&self) {
        self.log("HOLD");
    }

    fn retrieve(&self) {
        self.log("RETRIEVE");
    }
}

struct LoggingSignalingFactory;

impl SignalingProxyFactory for LoggingSignalingFactory {
    fn create(&self, session: SessionId) -> Arc<dyn SignalingProxy> {
        Arc::new(LoggingSignaling {
            session: AtomicI32::new(session.as_i32()),
        })
    }
}

struct LoggingMedia;

impl MediaProxy for LoggingMedia {
    fn play_tone(&self, tone: Tone) {
        info!("[media] play {:?}", tone);
    }

    fn stop_tone(&self) {
        info!("[media] stop tone");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Configuration loaded: {:?}", config);

    let history = Arc::new(CallHistory::new(config.call_log.max_entries));
    let timers = TokioTimerFactory::current()
        .ok_or_else(|| anyhow::anyhow!("no tokio runtime available"))?;

    let deps = SessionDeps {
        orchestrator: Some(Arc::new(LoggingOrchestrator)),
        signaling: Arc::new(LoggingSignalingFactory),
        timers: Arc::new(timers),
        media: Arc::new(LoggingMedia),
        call_log: history.clone(),
        timer_config: config.timers,
    };

    info!("=== Incoming call, answered, held, released by far end ===");
    let (call, task) = spawn_session(SessionId::new(0), deps.clone());
    call.incoming("5552000", "Alice")?;
    call.accept()?;
    tokio::time::sleep(Duration::from_millis(500)).await;
    call.hold()?;
    call.retrieve()?;
    call.release(ReleaseOrigin::Remote)?;
    info!("Waiting for released timer...");
    tokio::time::sleep(config.timers.interval(TimerKind::Released) + Duration::from_millis(100)).await;
    info!("Session state: {}", call.state().await?);
    call.destroy().await?;
    task.await?;

    info!("=== Outgoing call, rejected by far end ===");
    let (call, task) = spawn_session(SessionId::new(1), deps);
    call.dial("5551000", "Bob")?;
    call.remote_alerting()?;
    call.reject()?;
    let snapshot = call.snapshot().await?;
    info!("Snapshot: {}", serde_json::to_string(&snapshot)?);
    call.destroy().await?;
    task.await?;

    info!("=== Call log ===");
    for entry in history.recent(10) {
        info!("{}", serde_json::to_string(&entry)?);
    }

    Ok(())
}

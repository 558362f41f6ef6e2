//! Stub collaborators shared by the unit tests.
//!
//! Every stub records the calls it receives; assertions run against
//! those recordings. A shared event log lets tests assert ordering
//! across collaborators (e.g. database drop before container stop).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use seedbed_core::config::SeedRow;
use seedbed_core::ident::SuffixSource;
use seedbed_core::output::TableSeedResult;
use seedbed_runtime::connection::{
    Connection, ConnectionError, Connector, Credentials, ServerAddress,
};
use seedbed_runtime::container::{
    ContainerError, ContainerRuntime, ContainerSpec, RunningContainer,
};
use seedbed_runtime::migration::{MigrationSource, MigrationSourceError, MigrationUnit};
use seedbed_runtime::seed::{SeedWriteError, SeedWriter};

use crate::orchestrator::{Collaborators, Orchestrator};
use crate::readiness::ReadinessConfig;

/// Statement predicate used to inject execute failures.
pub(crate) type FailWhen = Arc<dyn Fn(&str) -> bool + Send + Sync>;

pub(crate) type EventLog = Arc<Mutex<Vec<String>>>;

fn log_event(events: &Option<EventLog>, entry: String) {
    if let Some(events) = events {
        events.lock().unwrap().push(entry);
    }
}

// ---------------------------------------------------------------------------
// Connection / connector
// ---------------------------------------------------------------------------

pub(crate) struct RecordingConnection {
    /// The database this connection is bound to.
    pub label: String,
    pub statements: Mutex<Vec<String>>,
    pub fail_when: Option<FailWhen>,
    pub events: Option<EventLog>,
}

impl RecordingConnection {
    pub fn named(label: &str) -> Self {
        Self {
            label: label.to_string(),
            statements: Mutex::new(Vec::new()),
            fail_when: None,
            events: None,
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    async fn execute(&self, statement: &str) -> Result<u64, ConnectionError> {
        self.statements
            .lock()
            .unwrap()
            .push(statement.to_string());
        log_event(&self.events, statement.to_string());
        if let Some(fail_when) = &self.fail_when {
            if fail_when(statement) {
                return Err(ConnectionError::Execute {
                    reason: "injected failure".to_string(),
                });
            }
        }
        Ok(1)
    }

    async fn close(&self) -> Result<(), ConnectionError> {
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct StubConnector {
    attempts: AtomicUsize,
    /// Number of leading connection attempts that are refused.
    fail_first: usize,
    pub connects: Mutex<Vec<Credentials>>,
    pub created: Mutex<Vec<Arc<RecordingConnection>>>,
    pub fail_when: Option<FailWhen>,
    pub events: Option<EventLog>,
}

impl StubConnector {
    pub fn failing_first(n: usize) -> Self {
        Self {
            fail_first: n,
            ..Self::default()
        }
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Connections handed out so far, in creation order.
    pub fn connections(&self) -> Vec<Arc<RecordingConnection>> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for StubConnector {
    async fn connect(
        &self,
        address: &ServerAddress,
        credentials: &Credentials,
    ) -> Result<Arc<dyn Connection>, ConnectionError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_first {
            return Err(ConnectionError::Connect {
                address: address.to_string(),
                reason: "connection refused".to_string(),
            });
        }

        self.connects.lock().unwrap().push(credentials.clone());
        let connection = Arc::new(RecordingConnection {
            label: credentials.database.clone(),
            statements: Mutex::new(Vec::new()),
            fail_when: self.fail_when.clone(),
            events: self.events.clone(),
        });
        self.created.lock().unwrap().push(Arc::clone(&connection));
        Ok(connection)
    }
}

// ---------------------------------------------------------------------------
// Container runtime
// ---------------------------------------------------------------------------

pub(crate) struct StubRuntime {
    pub started: Mutex<Vec<ContainerSpec>>,
    pub stopped: Mutex<Vec<String>>,
    pub fail_start: bool,
    /// Port reported back when the spec asked for an ephemeral one.
    pub assigned_port: u16,
    pub events: Option<EventLog>,
}

impl Default for StubRuntime {
    fn default() -> Self {
        Self {
            started: Mutex::new(Vec::new()),
            stopped: Mutex::new(Vec::new()),
            fail_start: false,
            assigned_port: 54321,
            events: None,
        }
    }
}

impl StubRuntime {
    pub fn stop_calls(&self) -> Vec<String> {
        self.stopped.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContainerRuntime for StubRuntime {
    async fn start(&self, spec: &ContainerSpec) -> Result<RunningContainer, ContainerError> {
        if self.fail_start {
            return Err(ContainerError::Start {
                name: spec.name.clone(),
                reason: "image pull failed".to_string(),
            });
        }

        let mut started = self.started.lock().unwrap();
        let id = format!("ctr-{}", started.len());
        started.push(spec.clone());
        log_event(&self.events, format!("start {id}"));

        Ok(RunningContainer {
            id,
            host: "127.0.0.1".to_string(),
            port: if spec.port == 0 {
                self.assigned_port
            } else {
                spec.port
            },
        })
    }

    async fn stop(&self, id: &str) -> Result<(), ContainerError> {
        self.stopped.lock().unwrap().push(id.to_string());
        log_event(&self.events, format!("stop {id}"));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Seed writer
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct RecordingSeedWriter {
    pub calls: Mutex<Vec<(String, Vec<SeedRow>)>>,
    pub fail_table: Option<String>,
}

impl RecordingSeedWriter {
    pub fn call_order(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(table, _)| table.clone())
            .collect()
    }
}

#[async_trait]
impl SeedWriter for RecordingSeedWriter {
    async fn insert(
        &self,
        _connection: &dyn Connection,
        table: &str,
        rows: &[SeedRow],
    ) -> Result<TableSeedResult, SeedWriteError> {
        if self.fail_table.as_deref() == Some(table) {
            return Err(SeedWriteError {
                table: table.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        self.calls
            .lock()
            .unwrap()
            .push((table.to_string(), rows.to_vec()));
        Ok(TableSeedResult {
            table: table.to_string(),
            rows_inserted: rows.len() as u64,
        })
    }
}

// ---------------------------------------------------------------------------
// Migration source
// ---------------------------------------------------------------------------

pub(crate) struct StaticSource(pub Vec<MigrationUnit>);

#[async_trait]
impl MigrationSource for StaticSource {
    async fn load(
        &self,
        _root: &std::path::Path,
    ) -> Result<Vec<MigrationUnit>, MigrationSourceError> {
        Ok(self.0.clone())
    }
}

// ---------------------------------------------------------------------------
// Suffix source
// ---------------------------------------------------------------------------

/// Deterministic suffix source counting up from zero.
#[derive(Default)]
pub(crate) struct SequentialSuffix(AtomicUsize);

impl SuffixSource for SequentialSuffix {
    fn suffix(&self) -> String {
        format!("s{}", self.0.fetch_add(1, Ordering::SeqCst))
    }
}

// ---------------------------------------------------------------------------
// Wired-up environment
// ---------------------------------------------------------------------------

/// All stubs wired to one shared event log, plus an orchestrator with
/// deterministic suffixes and a fast readiness config.
pub(crate) struct TestEnv {
    pub runtime: Arc<StubRuntime>,
    pub connector: Arc<StubConnector>,
    pub seed_writer: Arc<RecordingSeedWriter>,
    pub events: EventLog,
}

impl TestEnv {
    pub fn new() -> Self {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        Self {
            runtime: Arc::new(StubRuntime {
                events: Some(Arc::clone(&events)),
                ..StubRuntime::default()
            }),
            connector: Arc::new(StubConnector {
                events: Some(Arc::clone(&events)),
                ..StubConnector::default()
            }),
            seed_writer: Arc::new(RecordingSeedWriter::default()),
            events,
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            runtime: Arc::clone(&self.runtime) as Arc<dyn ContainerRuntime>,
            connector: Arc::clone(&self.connector) as Arc<dyn Connector>,
            seed_writer: Arc::clone(&self.seed_writer) as Arc<dyn SeedWriter>,
        }
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.collaborators())
            .with_readiness(fast_readiness())
            .with_suffix_source(Arc::new(SequentialSuffix::default()))
    }

    pub fn event_entries(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

pub(crate) fn fast_readiness() -> ReadinessConfig {
    ReadinessConfig {
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(4),
        multiplier: 2.0,
        timeout: Duration::from_millis(250),
    }
}

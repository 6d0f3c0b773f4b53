//! Audit Orchestration Finite State Machine
//!
//! Sequences one audit run: `Idle → Parsing → Analyzing → Completed`, with
//! `Error` reachable from either working state and `Idle` reachable from
//! anywhere via reset. The transition function is pure; the orchestrator
//! owns the live state and drives the extractor and audit client.

use crate::{AuditClient, LlmError, LlmResult, UNEXPECTED_ERROR_MESSAGE};
use orchestrator_core::{ensure_zip_name, ArchiveExtractor, ProjectData, TestResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Phase exposed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppStatus {
    Idle,
    Parsing,
    Analyzing,
    Completed,
    Error,
}

impl std::fmt::Display for AppStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AppStatus::Idle => "IDLE",
            AppStatus::Parsing => "PARSING",
            AppStatus::Analyzing => "ANALYZING",
            AppStatus::Completed => "COMPLETED",
            AppStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// FSM states, each carrying what that phase knows
#[derive(Debug, Clone, PartialEq)]
pub enum AuditState {
    /// Waiting for an archive
    Idle,
    /// Extracting files from the archive
    Parsing { archive_name: String },
    /// Waiting on the model
    Analyzing { project: ProjectData },
    /// Audit finished
    Completed {
        project: ProjectData,
        results: Vec<TestResult>,
    },
    /// Run failed; `message` is user-facing
    Error { message: String },
}

/// FSM events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum AuditEvent {
    /// An archive was chosen
    FileSelected { archive_name: String },
    ExtractionSucceeded { project: ProjectData },
    AnalysisSucceeded { results: Vec<TestResult> },
    /// A stage failed
    Failed { message: String },
    /// Back to the start
    Reset,
}

impl AuditEvent {
    fn name(&self) -> &'static str {
        match self {
            AuditEvent::FileSelected { .. } => "FileSelected",
            AuditEvent::ExtractionSucceeded { .. } => "ExtractionSucceeded",
            AuditEvent::AnalysisSucceeded { .. } => "AnalysisSucceeded",
            AuditEvent::Failed { .. } => "Failed",
            AuditEvent::Reset => "Reset",
        }
    }
}

impl AuditState {
    pub fn status(&self) -> AppStatus {
        match self {
            AuditState::Idle => AppStatus::Idle,
            AuditState::Parsing { .. } => AppStatus::Parsing,
            AuditState::Analyzing { .. } => AppStatus::Analyzing,
            AuditState::Completed { .. } => AppStatus::Completed,
            AuditState::Error { .. } => AppStatus::Error,
        }
    }

    /// A run is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, AuditState::Parsing { .. } | AuditState::Analyzing { .. })
    }

    pub fn project(&self) -> Option<&ProjectData> {
        match self {
            AuditState::Analyzing { project } | AuditState::Completed { project, .. } => {
                Some(project)
            }
            _ => None,
        }
    }

    /// Results of a completed run; empty in every other state
    pub fn results(&self) -> &[TestResult] {
        match self {
            AuditState::Completed { results, .. } => results,
            _ => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            AuditState::Error { message } => Some(message),
            _ => None,
        }
    }

    /// Compute the next state. Pairs not listed are rejected and the
    /// caller keeps the current state.
    pub fn transition(&self, event: AuditEvent) -> LlmResult<AuditState> {
        match (self, event) {
            (_, AuditEvent::Reset) => Ok(AuditState::Idle),

            (AuditState::Idle | AuditState::Error { .. }, AuditEvent::FileSelected { archive_name }) => {
                Ok(AuditState::Parsing { archive_name })
            }

            (AuditState::Parsing { .. }, AuditEvent::ExtractionSucceeded { project }) => {
                Ok(AuditState::Analyzing { project })
            }

            (AuditState::Analyzing { project }, AuditEvent::AnalysisSucceeded { results }) => {
                Ok(AuditState::Completed {
                    project: project.clone(),
                    results,
                })
            }

            (AuditState::Parsing { .. } | AuditState::Analyzing { .. }, AuditEvent::Failed { message }) => {
                let message = if message.trim().is_empty() {
                    UNEXPECTED_ERROR_MESSAGE.to_string()
                } else {
                    message
                };
                Ok(AuditState::Error { message })
            }

            (state, event) => Err(LlmError::InvalidTransition {
                status: state.status(),
                event: event.name().to_string(),
            }),
        }
    }
}

type StateListener = Box<dyn Fn(&AuditState) + Send + Sync>;

/// Live state plus the generation of the run allowed to drive it
#[derive(Debug)]
struct StateSlot {
    state: AuditState,
    /// Bumped on every run start and reset; events from older runs are dropped
    epoch: u64,
}

/// Owns the live audit state and runs the pipeline
pub struct AuditOrchestrator {
    slot: Arc<RwLock<StateSlot>>,
    extractor: ArchiveExtractor,
    client: AuditClient,
    state_listeners: Vec<StateListener>,
}

impl std::fmt::Debug for AuditOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditOrchestrator")
            .field("extractor", &self.extractor)
            .field("client", &self.client)
            .field("state_listeners", &self.state_listeners.len())
            .finish_non_exhaustive()
    }
}

impl AuditOrchestrator {
    pub fn new(extractor: ArchiveExtractor, client: AuditClient) -> Self {
        Self {
            slot: Arc::new(RwLock::new(StateSlot {
                state: AuditState::Idle,
                epoch: 0,
            })),
            extractor,
            client,
            state_listeners: Vec::new(),
        }
    }

    /// Called with the new state after every transition
    pub fn add_state_listener<F>(&mut self, listener: F)
    where
        F: Fn(&AuditState) + Send + Sync + 'static,
    {
        self.state_listeners.push(Box::new(listener));
    }

    pub async fn state(&self) -> AuditState {
        self.slot.read().await.state.clone()
    }

    pub async fn status(&self) -> AppStatus {
        self.slot.read().await.state.status()
    }

    /// Back to `Idle`. A run still in flight loses the right to report.
    pub async fn reset(&self) -> LlmResult<AuditState> {
        let next = {
            let mut slot = self.slot.write().await;
            slot.epoch += 1;
            slot.state = slot.state.transition(AuditEvent::Reset)?;
            slot.state.clone()
        };
        debug!("Audit state reset");
        self.notify(&next);
        Ok(next)
    }

    /// Apply an event on behalf of the run started at `epoch`
    async fn apply(&self, epoch: u64, archive_name: &str, event: AuditEvent) -> LlmResult<AuditState> {
        let next = {
            let mut slot = self.slot.write().await;
            if slot.epoch != epoch {
                debug!("Dropping {} from superseded run of '{}'", event.name(), archive_name);
                return Err(LlmError::Superseded {
                    archive_name: archive_name.to_string(),
                });
            }
            let next = slot.state.transition(event)?;
            debug!("Audit state {} -> {}", slot.state.status(), next.status());
            slot.state = next.clone();
            next
        };
        self.notify(&next);
        Ok(next)
    }

    fn notify(&self, state: &AuditState) {
        for listener in &self.state_listeners {
            listener(state);
        }
    }

    async fn fail(&self, epoch: u64, archive_name: &str, message: String) -> LlmResult<AuditState> {
        error!("Audit failed: {}", message);
        self.apply(epoch, archive_name, AuditEvent::Failed { message })
            .await
    }

    /// Run one audit to completion.
    ///
    /// Returns the final state, `Completed` or `Error`. Returns `Err` when
    /// the run could not start (non-zip name, audit already running) or was
    /// superseded by a reset or a newer run; the state is then left as is.
    pub async fn run(&self, archive_name: &str, archive: Vec<u8>) -> LlmResult<AuditState> {
        ensure_zip_name(archive_name).map_err(orchestrator_core::Error::from)?;

        // Guard, transition and epoch bump under one lock so two runs cannot both start
        let (epoch, parsing) = {
            let mut slot = self.slot.write().await;
            if slot.state.is_busy() {
                return Err(LlmError::AuditInProgress(slot.state.status()));
            }
            let next = slot.state.transition(AuditEvent::FileSelected {
                archive_name: archive_name.to_string(),
            })?;
            slot.epoch += 1;
            slot.state = next.clone();
            (slot.epoch, next)
        };
        self.notify(&parsing);
        info!("Starting audit of '{}'", archive_name);

        let project = match self
            .extractor
            .extract_async(archive_name.to_string(), archive)
            .await
        {
            Ok(project) => project,
            Err(e) => return self.fail(epoch, archive_name, e.to_string()).await,
        };

        self.apply(
            epoch,
            archive_name,
            AuditEvent::ExtractionSucceeded {
                project: project.clone(),
            },
        )
        .await?;

        match self.client.analyze(&project).await {
            Ok(results) => {
                info!("Audit of '{}' returned {} results", archive_name, results.len());
                self.apply(epoch, archive_name, AuditEvent::AnalysisSucceeded { results })
                    .await
            }
            Err(e) => self.fail(epoch, archive_name, e.to_string()).await,
        }
    }
}

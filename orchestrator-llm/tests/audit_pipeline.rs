//! End-to-end audit runs with a scripted transport

use async_trait::async_trait;
use orchestrator_core::{ArchiveError, ArchiveExtractor, ArchiveReader, ExtractionPolicy, RawEntry};
use orchestrator_llm::{
    AppStatus, AuditClient, AuditOrchestrator, AuditState, AuditTransport, LlmError, LlmResult,
    PromptBuilder, ANALYSIS_FAILED_MESSAGE,
};
use proptest::prelude::*;
use std::io::{Cursor, Write};
use std::sync::{Arc, Condvar, Mutex};
use zip::write::FileOptions;

/// Replies with a fixed body and records the prompts it saw
struct ScriptedTransport {
    reply: LlmResult<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn ok(body: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(body.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(LlmError::Api {
                status: 503,
                body: "overloaded".to_string(),
            }),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl AuditTransport for ScriptedTransport {
    async fn complete_json(&self, prompt: &str) -> LlmResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(body) => Ok(body.clone()),
            Err(LlmError::Api { status, body }) => Err(LlmError::Api {
                status: *status,
                body: body.clone(),
            }),
            Err(_) => Err(LlmError::Analysis),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Blocks until released, so a run can be observed mid-flight
struct GatedTransport {
    gate: tokio::sync::Notify,
}

#[async_trait]
impl AuditTransport for GatedTransport {
    async fn complete_json(&self, _prompt: &str) -> LlmResult<String> {
        self.gate.notified().await;
        Ok("[]".to_string())
    }

    fn model_name(&self) -> &str {
        "gated"
    }
}

/// Holds archive `b"A"` in the extractor until released; any other
/// archive yields `b.js` at once
#[derive(Default)]
struct GatedReader {
    open: Mutex<bool>,
    released: Condvar,
}

impl GatedReader {
    fn release(&self) {
        *self.open.lock().unwrap() = true;
        self.released.notify_all();
    }
}

impl ArchiveReader for GatedReader {
    fn read_entries(
        &self,
        archive: &[u8],
        _select: &dyn Fn(&str) -> bool,
    ) -> Result<Vec<RawEntry>, ArchiveError> {
        if archive == b"A" {
            let mut open = self.open.lock().unwrap();
            while !*open {
                open = self.released.wait(open).unwrap();
            }
            Ok(vec![RawEntry::new("a.js", "1")])
        } else {
            Ok(vec![RawEntry::new("b.js", "2")])
        }
    }
}

fn gated_orchestrator(reader: Arc<GatedReader>) -> Arc<AuditOrchestrator> {
    let client = AuditClient::new(ScriptedTransport::ok("[]"), PromptBuilder::default()).unwrap();
    Arc::new(AuditOrchestrator::new(
        ArchiveExtractor::new(reader, ExtractionPolicy::default()),
        client,
    ))
}

fn zip_of(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in files {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn orchestrator(transport: Arc<dyn AuditTransport>) -> AuditOrchestrator {
    let client = AuditClient::new(transport, PromptBuilder::default()).unwrap();
    AuditOrchestrator::new(ArchiveExtractor::zip(ExtractionPolicy::default()), client)
}

fn ten_results() -> String {
    let items: Vec<String> = (1..=10)
        .map(|i| {
            format!(
                r#"{{"id":"t-{i}","testName":"Check {i}","success":{},"logs":["ran"]}}"#,
                i <= 7
            )
        })
        .collect();
    format!("[{}]", items.join(","))
}

#[tokio::test]
async fn test_successful_run_completes() {
    let transport = ScriptedTransport::ok(&ten_results());
    let orchestrator = orchestrator(transport.clone());

    let state = orchestrator
        .run("shop.zip", zip_of(&[("src/app.js", "console.log(1)")]))
        .await
        .unwrap();

    assert_eq!(state.status(), AppStatus::Completed);
    assert_eq!(state.results().len(), 10);
    assert_eq!(state.project().unwrap().files.len(), 1);
    assert_eq!(orchestrator.status().await, AppStatus::Completed);

    let prompts = transport.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("FILE: src/app.js\nCONTENT:\nconsole.log(1)\n---"));
}

#[tokio::test]
async fn test_non_json_reply_is_error_with_fixed_message() {
    let orchestrator = orchestrator(ScriptedTransport::ok("not json"));

    let state = orchestrator
        .run("shop.zip", zip_of(&[("a.ts", "x")]))
        .await
        .unwrap();

    assert_eq!(state.status(), AppStatus::Error);
    assert_eq!(state.error_message(), Some(ANALYSIS_FAILED_MESSAGE));
    assert!(state.results().is_empty());
}

#[tokio::test]
async fn test_transport_failure_is_error_with_fixed_message() {
    let orchestrator = orchestrator(ScriptedTransport::failing());

    let state = orchestrator
        .run("shop.zip", zip_of(&[("a.ts", "x")]))
        .await
        .unwrap();

    assert_eq!(state.error_message(), Some(ANALYSIS_FAILED_MESSAGE));
}

#[tokio::test]
async fn test_schema_mismatch_is_distinguishable() {
    let orchestrator = orchestrator(ScriptedTransport::ok(r#"{"tests": 10}"#));

    let state = orchestrator
        .run("shop.zip", zip_of(&[("a.ts", "x")]))
        .await
        .unwrap();

    let message = state.error_message().unwrap();
    assert_ne!(message, ANALYSIS_FAILED_MESSAGE);
    assert!(message.contains("schema"));
}

#[tokio::test]
async fn test_empty_reply_completes_with_no_results() {
    let orchestrator = orchestrator(ScriptedTransport::ok(""));
    let state = orchestrator
        .run("shop.zip", zip_of(&[("a.ts", "x")]))
        .await
        .unwrap();
    assert_eq!(state.status(), AppStatus::Completed);
    assert!(state.results().is_empty());
}

#[tokio::test]
async fn test_non_zip_rejected_and_state_unchanged() {
    let transport = ScriptedTransport::ok("[]");
    let orchestrator = orchestrator(transport.clone());

    let err = orchestrator
        .run("project.tar.gz", b"whatever".to_vec())
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::Core(_)));
    assert_eq!(orchestrator.status().await, AppStatus::Idle);
    assert!(transport.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupt_archive_moves_to_error() {
    let transport = ScriptedTransport::ok("[]");
    let orchestrator = orchestrator(transport.clone());

    let state = orchestrator
        .run("broken.ZIP", b"PK but not really".to_vec())
        .await
        .unwrap();

    assert_eq!(state.status(), AppStatus::Error);
    assert!(state.error_message().unwrap().contains("Invalid archive"));
    assert!(transport.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_listeners_see_every_phase() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut orchestrator = orchestrator(ScriptedTransport::ok("[]"));
    let sink = Arc::clone(&seen);
    orchestrator.add_state_listener(move |state: &AuditState| {
        sink.lock().unwrap().push(state.status());
    });

    orchestrator
        .run("a.zip", zip_of(&[("a.md", "# hi")]))
        .await
        .unwrap();
    orchestrator.reset().await.unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            AppStatus::Parsing,
            AppStatus::Analyzing,
            AppStatus::Completed,
            AppStatus::Idle
        ]
    );
}

#[tokio::test]
async fn test_second_run_rejected_while_busy() {
    let transport = Arc::new(GatedTransport {
        gate: tokio::sync::Notify::new(),
    });
    let orchestrator = Arc::new(orchestrator(transport.clone()));

    let first = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.run("a.zip", zip_of(&[("a.js", "1")])).await })
    };

    while orchestrator.status().await != AppStatus::Analyzing {
        tokio::task::yield_now().await;
    }

    let err = orchestrator
        .run("b.zip", zip_of(&[("b.js", "2")]))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::AuditInProgress(AppStatus::Analyzing)));

    transport.gate.notify_one();
    let state = first.await.unwrap().unwrap();
    assert_eq!(state.status(), AppStatus::Completed);
}

#[tokio::test]
async fn test_reset_after_error_allows_new_run() {
    let orchestrator = orchestrator(ScriptedTransport::ok("[]"));
    orchestrator.run("bad.zip", b"nope".to_vec()).await.unwrap();
    assert_eq!(orchestrator.status().await, AppStatus::Error);

    assert_eq!(orchestrator.reset().await.unwrap(), AuditState::Idle);
    let state = orchestrator
        .run("good.zip", zip_of(&[("a.css", "a{}")]))
        .await
        .unwrap();
    assert_eq!(state.status(), AppStatus::Completed);
}

#[tokio::test]
async fn test_reset_and_rerun_while_parsing_keeps_newer_run() {
    let reader = Arc::new(GatedReader::default());
    let orchestrator = gated_orchestrator(Arc::clone(&reader));

    let first = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.run("a.zip", b"A".to_vec()).await })
    };
    while orchestrator.status().await != AppStatus::Parsing {
        tokio::task::yield_now().await;
    }

    orchestrator.reset().await.unwrap();
    let second = orchestrator.run("b.zip", b"B".to_vec()).await.unwrap();
    assert_eq!(second.status(), AppStatus::Completed);

    reader.release();
    let err = first.await.unwrap().unwrap_err();
    assert!(matches!(err, LlmError::Superseded { ref archive_name } if archive_name == "a.zip"));

    let state = orchestrator.state().await;
    assert_eq!(state.status(), AppStatus::Completed);
    let project = state.project().unwrap();
    assert_eq!(project.name, "b.zip");
    assert_eq!(project.files[0].path, "b.js");
}

#[tokio::test]
async fn test_reset_while_parsing_stays_idle() {
    let reader = Arc::new(GatedReader::default());
    let mut orchestrator = {
        let client =
            AuditClient::new(ScriptedTransport::ok("[]"), PromptBuilder::default()).unwrap();
        AuditOrchestrator::new(
            ArchiveExtractor::new(Arc::clone(&reader) as Arc<dyn ArchiveReader>, ExtractionPolicy::default()),
            client,
        )
    };
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = Arc::clone(&seen);
        orchestrator.add_state_listener(move |state| seen.lock().unwrap().push(state.status()));
    }
    let orchestrator = Arc::new(orchestrator);

    let first = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.run("a.zip", b"A".to_vec()).await })
    };
    while orchestrator.status().await != AppStatus::Parsing {
        tokio::task::yield_now().await;
    }

    orchestrator.reset().await.unwrap();
    reader.release();

    assert!(matches!(first.await.unwrap(), Err(LlmError::Superseded { .. })));
    assert_eq!(orchestrator.state().await, AuditState::Idle);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![AppStatus::Parsing, AppStatus::Idle]
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_oversized_file_sends_exact_prefix(extra in 1usize..500, ch in "[a-zé漢]") {
        let body: String = ch.repeat(2000 + extra);
        let project = orchestrator_core::ProjectData::new(
            "big.zip",
            vec![orchestrator_core::ProjectFile::new("big.js", body.clone())],
        );

        let prompt = PromptBuilder::default().build(&project);

        let prefix: String = body.chars().take(2000).collect();
        let block = format!("FILE: big.js\nCONTENT:\n{prefix}... [truncated]\n---");
        prop_assert!(prompt.text.contains(&block));
        prop_assert!(!prompt.text.contains(&body));
        prop_assert_eq!(prompt.truncated_files, 1);
    }
}

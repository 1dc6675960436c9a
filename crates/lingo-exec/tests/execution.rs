//! Plan execution against mock providers.

use async_trait::async_trait;
use lingo_core::{
    Availability, CallContext, Capability, DetectedLanguage, ExecutionPlan, ExecutionStep,
    ExecutionType, Intent, PageContext, Phase, ProgressSink, ProviderError, ProviderRegistry,
    Request, StepInput, StepRole, SummarizeOptions, Summarizer, TextGenerator, Translator,
    WriteOptions, Writer,
};
use lingo_exec::{execute_step, CapabilityDispatcher, Payload, PlanExecutor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// Mock providers
// =============================================================================

#[derive(Default)]
struct MockSummarizer {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, text: &str, options: &SummarizeOptions) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Failed("summarizer crashed".to_string()));
        }
        Ok(format!("summary[{}]({})", options.length.as_str(), text))
    }
}

struct MockTranslator {
    calls: AtomicUsize,
    detected: &'static str,
    seen: Mutex<Vec<String>>,
    availability: Availability,
}

impl MockTranslator {
    fn detecting(detected: &'static str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            detected,
            seen: Mutex::new(Vec::new()),
            availability: Availability::Available,
        }
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(text.to_string());
        Ok(format!("{}>{}:{}", source, target, text))
    }

    async fn detect_language(&self, _text: &str) -> Result<DetectedLanguage, ProviderError> {
        Ok(DetectedLanguage {
            language: self.detected.to_string(),
            confidence: 0.9,
        })
    }

    async fn availability(&self, _source: &str, _target: &str) -> Availability {
        self.availability.clone()
    }
}

#[derive(Default)]
struct MockWriter {
    calls: AtomicUsize,
}

#[async_trait]
impl Writer for MockWriter {
    async fn write(&self, _prompt: &str, _options: &WriteOptions) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("Writing assistance is not yet available in this browser.".to_string())
    }
}

struct MockGenerator {
    calls: AtomicUsize,
    delay: Duration,
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(format!("answer to: {}", prompt.lines().last().unwrap_or_default()))
    }
}

struct Fixture {
    summarizer: Arc<MockSummarizer>,
    translator: Arc<MockTranslator>,
    writer: Arc<MockWriter>,
    generator: Arc<MockGenerator>,
    executor: PlanExecutor,
    dispatcher: Arc<CapabilityDispatcher>,
}

fn fixture(summarizer: MockSummarizer, translator: MockTranslator) -> Fixture {
    let summarizer = Arc::new(summarizer);
    let translator = Arc::new(translator);
    let writer = Arc::new(MockWriter::default());
    let generator = Arc::new(MockGenerator {
        calls: AtomicUsize::new(0),
        delay: Duration::from_millis(10),
    });

    let registry = ProviderRegistry::new()
        .with_summarizer(summarizer.clone())
        .with_translator(translator.clone())
        .with_writer(writer.clone())
        .with_text_generator(generator.clone());
    let dispatcher = Arc::new(CapabilityDispatcher::new(registry, "en"));

    Fixture {
        summarizer,
        translator,
        writer,
        generator,
        executor: PlanExecutor::new(dispatcher.clone()),
        dispatcher,
    }
}

fn page_request(text: &str) -> Request {
    Request::new(text).with_context(PageContext {
        title: Some("Article".to_string()),
        url: Some("https://example.com/a".to_string()),
        content: Some("The page body.".to_string()),
    })
}

fn summarize_then_translate(target: &str) -> ExecutionPlan {
    ExecutionPlan {
        execution_type: ExecutionType::Sequential,
        steps: vec![
            ExecutionStep::new(1, Capability::SummarizePage, StepInput::CurrentPage)
                .output("summary_text")
                .param("length", "short"),
            ExecutionStep::new(2, Capability::TranslateText, StepInput::Output("summary_text".into()))
                .output("final_result")
                .param("source_language", "auto")
                .param("target_language", target),
        ],
        final_output_language: Some(target.to_string()),
        reasoning: String::new(),
    }
}

fn intent() -> Intent {
    Intent::default_research("", "test")
}

// =============================================================================
// Sequential
// =============================================================================

#[tokio::test]
async fn test_sequential_hands_output_forward() {
    let f = fixture(MockSummarizer::default(), MockTranslator::detecting("en"));
    let request = page_request("Give me a brief overview in German");

    let result = f
        .executor
        .execute(&summarize_then_translate("de"), &request, &intent(), &CallContext::new())
        .await;

    assert!(result.success);
    assert_eq!(result.execution_type, ExecutionType::Sequential);
    assert_eq!(result.results.len(), 2);
    assert_eq!(result.results[0].role, StepRole::Intermediate);
    assert_eq!(result.results[1].role, StepRole::Primary);
    assert_eq!(
        result.results[1].result.as_deref(),
        Some("auto>de:summary[short](The page body.)")
    );
    assert_eq!(
        f.translator.seen.lock().unwrap().as_slice(),
        ["summary[short](The page body.)".to_string()]
    );
    assert_eq!(result.processing_stats.succeeded, 2);
}

#[tokio::test]
async fn test_sequential_stops_at_failing_step() {
    let f = fixture(
        MockSummarizer {
            calls: AtomicUsize::new(0),
            fail: true,
        },
        MockTranslator::detecting("en"),
    );

    let result = f
        .executor
        .execute(&summarize_then_translate("de"), &page_request("x"), &intent(), &CallContext::new())
        .await;

    assert!(!result.success);
    assert_eq!(result.results.len(), 1);
    assert_eq!(result.results[0].role, StepRole::Failed);
    assert!(result.results[0].error.as_deref().unwrap().contains("summarizer crashed"));
    assert_eq!(f.translator.calls.load(Ordering::SeqCst), 0);
    assert_eq!(result.processing_stats.failed, 1);
}

#[tokio::test]
async fn test_failure_in_middle_keeps_earlier_steps() {
    let f = fixture(MockSummarizer::default(), MockTranslator {
        availability: Availability::Unavailable("pair not supported".to_string()),
        ..MockTranslator::detecting("en")
    });
    let mut plan = summarize_then_translate("ko");
    plan.steps.push(
        ExecutionStep::new(3, Capability::WriteContent, StepInput::Output("final_result".into())),
    );

    let result = f
        .executor
        .execute(&plan, &page_request("x"), &intent(), &CallContext::new())
        .await;

    assert!(result.success);
    let steps: Vec<u32> = result.results.iter().map(|r| r.step).collect();
    assert_eq!(steps, vec![1, 2]);
    assert!(result.results[1].error.as_deref().unwrap().starts_with("PROVIDER/UNAVAILABLE/translator"));
    assert_eq!(f.translator.calls.load(Ordering::SeqCst), 0);
    assert_eq!(f.writer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_translation_skipped_when_already_in_target() {
    let f = fixture(MockSummarizer::default(), MockTranslator::detecting("de"));

    let result = f
        .executor
        .execute(&summarize_then_translate("de"), &page_request("x"), &intent(), &CallContext::new())
        .await;

    assert!(result.success);
    assert_eq!(result.results[1].result.as_deref(), Some("summary[short](The page body.)"));
    assert_eq!(f.translator.calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Parallel
// =============================================================================

fn parallel_plan() -> ExecutionPlan {
    ExecutionPlan {
        execution_type: ExecutionType::Parallel,
        steps: vec![
            ExecutionStep::new(1, Capability::SummarizePage, StepInput::CurrentPage),
            ExecutionStep::new(2, Capability::ResearchQuery, StepInput::UserMessage),
            ExecutionStep::new(3, Capability::WriteContent, StepInput::UserMessage),
        ],
        final_output_language: None,
        reasoning: String::new(),
    }
}

#[tokio::test]
async fn test_parallel_isolates_failure() {
    let f = fixture(
        MockSummarizer {
            calls: AtomicUsize::new(0),
            fail: true,
        },
        MockTranslator::detecting("en"),
    );

    let result = f
        .executor
        .execute(&parallel_plan(), &page_request("Summarize, research and draft"), &intent(), &CallContext::new())
        .await;

    assert!(result.success);
    assert_eq!(result.results.len(), 3);
    assert_eq!(result.results.iter().filter(|r| r.success).count(), 2);
    assert_eq!(result.results[0].role, StepRole::Failed);
    assert_eq!(result.results[1].role, StepRole::Secondary);
    assert_eq!(result.results[2].role, StepRole::Secondary);
    // placeholder text from the writer is a success
    assert!(result.results[2].success);
    assert_eq!(f.generator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.summarizer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_parallel_first_step_is_primary() {
    let f = fixture(MockSummarizer::default(), MockTranslator::detecting("en"));

    let result = f
        .executor
        .execute(&parallel_plan(), &page_request("x"), &intent(), &CallContext::new())
        .await;

    let roles: Vec<StepRole> = result.results.iter().map(|r| r.role).collect();
    assert_eq!(roles, vec![StepRole::Primary, StepRole::Secondary, StepRole::Secondary]);
    let steps: Vec<u32> = result.results.iter().map(|r| r.step).collect();
    assert_eq!(steps, vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_same_provider_calls_are_serialized() {
    let f = fixture(MockSummarizer::default(), MockTranslator::detecting("en"));
    let plan = ExecutionPlan {
        execution_type: ExecutionType::Parallel,
        steps: vec![
            ExecutionStep::new(1, Capability::ResearchQuery, StepInput::UserMessage),
            ExecutionStep::new(2, Capability::ResearchQuery, StepInput::CurrentPage),
        ],
        final_output_language: None,
        reasoning: String::new(),
    };

    let result = f
        .executor
        .execute(&plan, &page_request("What is this?"), &intent(), &CallContext::new())
        .await;

    assert_eq!(result.processing_stats.succeeded, 2);
    // two 10ms calls through one session cannot overlap
    assert!(result.results.iter().map(|r| r.latency_ms).max().unwrap() >= 20);
}

// =============================================================================
// Single step
// =============================================================================

#[tokio::test]
async fn test_execute_step_reports_progress() {
    let f = fixture(MockSummarizer::default(), MockTranslator::detecting("en"));
    let (sink, mut events) = ProgressSink::channel();
    let ctx = CallContext::new().with_progress(sink);
    let step = ExecutionStep::new(1, Capability::TranslateText, StepInput::UserMessage)
        .param("target_language", "fr");
    let request = Request::new("Translate to French: good morning");

    let result = execute_step(&f.dispatcher, &step, Payload::Prompt(&request.text), &request, &ctx).await;

    assert!(result.success);
    assert_eq!(result.result.as_deref(), Some("auto>fr:good morning"));
    assert!(matches!(events.recv().await.unwrap().phase, Phase::Executing { step: 1, .. }));
    assert!(matches!(
        events.recv().await.unwrap().phase,
        Phase::StepFinished { step: 1, success: true }
    ));
}

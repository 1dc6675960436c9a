//! End-to-end coordination against mock providers.

use async_trait::async_trait;
use lingo_core::{
    param_str, Agent, Availability, Capability, Category, CoordError, DetectedLanguage, EngineConfig,
    ExecutionType, PageContext, Phase, ProgressSink, ProviderError, ProviderRegistry, Request,
    SummarizeOptions, Summarizer, TextGenerator, Translator, WriteOptions, Writer,
};
use lingo_engine::{CoordinationEngine, PlanSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// =============================================================================
// Mock providers
// =============================================================================

#[derive(Default)]
struct Calls(AtomicUsize);

impl Calls {
    fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct MockSummarizer {
    calls: Calls,
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, text: &str, _options: &SummarizeOptions) -> Result<String, ProviderError> {
        self.calls.hit();
        Ok(format!("summary of {}", text))
    }
}

#[derive(Default)]
struct MockTranslator {
    calls: Calls,
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, _source: &str, target: &str) -> Result<String, ProviderError> {
        self.calls.hit();
        Ok(format!("[{}] {}", target, text))
    }

    async fn detect_language(&self, _text: &str) -> Result<DetectedLanguage, ProviderError> {
        Ok(DetectedLanguage {
            language: "en".to_string(),
            confidence: 0.99,
        })
    }
}

#[derive(Default)]
struct MockWriter {
    calls: Calls,
}

#[async_trait]
impl Writer for MockWriter {
    async fn write(&self, prompt: &str, _options: &WriteOptions) -> Result<String, ProviderError> {
        self.calls.hit();
        Ok(format!("draft: {}", prompt))
    }
}

/// Text generator that always fails
#[derive(Default)]
struct BrokenGenerator {
    calls: Calls,
}

#[async_trait]
impl TextGenerator for BrokenGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.calls.hit();
        Err(ProviderError::Failed("session crashed".to_string()))
    }

    async fn availability(&self) -> Availability {
        Availability::Available
    }
}

/// Text generator replying with a fixed script
struct ScriptedGenerator {
    calls: Calls,
    classification: String,
    plan: String,
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.calls.hit();
        if prompt.contains("executionPlan") {
            Ok(self.plan.clone())
        } else {
            Ok(self.classification.clone())
        }
    }
}

struct Fixture {
    summarizer: Arc<MockSummarizer>,
    translator: Arc<MockTranslator>,
    writer: Arc<MockWriter>,
    registry: ProviderRegistry,
}

fn fixture() -> Fixture {
    let summarizer = Arc::new(MockSummarizer::default());
    let translator = Arc::new(MockTranslator::default());
    let writer = Arc::new(MockWriter::default());
    let registry = ProviderRegistry::new()
        .with_summarizer(summarizer.clone())
        .with_translator(translator.clone())
        .with_writer(writer.clone());
    Fixture {
        summarizer,
        translator,
        writer,
        registry,
    }
}

fn engine(registry: ProviderRegistry) -> CoordinationEngine {
    CoordinationEngine::new(registry, EngineConfig::default()).unwrap()
}

fn page_request(text: &str) -> Request {
    Request::new(text).with_context(PageContext {
        title: Some("Rust 2024".to_string()),
        url: Some("https://example.com/rust".to_string()),
        content: Some("Rust ships a new edition.".to_string()),
    })
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn test_overview_in_german_runs_two_steps() {
    let f = fixture();
    let engine = engine(f.registry.clone());

    let outcome = engine
        .coordinate(&page_request("Give me a brief overview in German"))
        .await
        .unwrap();
    let result = &outcome.result;

    assert!(result.success);
    assert!(!result.degraded);
    assert!(result.intent.is_multi_step);
    assert!(!result.intent.ai_powered);
    assert_eq!(result.execution_type, ExecutionType::Sequential);

    let plan = result.plan.as_ref().unwrap();
    assert_eq!(plan.steps[0].capability, Capability::SummarizePage);
    assert_eq!(plan.steps[1].capability, Capability::TranslateText);
    assert_eq!(param_str(&plan.steps[1].params, "target_language"), Some("de"));

    assert_eq!(f.summarizer.calls.get(), 1);
    assert_eq!(f.translator.calls.get(), 1);
    assert_eq!(
        outcome.answer,
        "[de] summary of Rust ships a new edition.\n\n_Processed by: summarizer → translator_"
    );
}

#[tokio::test]
async fn test_plain_translation_is_single_step() {
    let f = fixture();
    let engine = engine(f.registry.clone());

    let outcome = engine
        .coordinate(&page_request("Translate this to Spanish"))
        .await
        .unwrap();
    let result = &outcome.result;

    assert_eq!(result.intent.primary, Category::Translate);
    assert!(!result.intent.is_multi_step);
    assert_eq!(result.execution_type, ExecutionType::Single);
    assert!(result.plan.is_none());
    assert_eq!(result.results.len(), 1);
    assert_eq!(result.results[0].agent, Agent::Translator);
    assert_eq!(result.results[0].action, Capability::TranslatePage.action());
    assert_eq!(outcome.answer, "[es] Rust ships a new edition.");
    assert_eq!(f.summarizer.calls.get(), 0);
}

#[tokio::test]
async fn test_empty_request_is_rejected_without_calls() {
    let f = fixture();
    let generator = Arc::new(BrokenGenerator::default());
    let engine = engine(f.registry.clone().with_text_generator(generator.clone()));

    for text in ["", "   \n\t"] {
        let err = engine.coordinate(&Request::new(text)).await.unwrap_err();
        assert!(matches!(err, CoordError::InvalidRequest(_)), "{:?}", err);
    }

    assert_eq!(generator.calls.get(), 0);
    assert_eq!(f.summarizer.calls.get(), 0);
    assert_eq!(f.translator.calls.get(), 0);
    assert_eq!(f.writer.calls.get(), 0);
}

// =============================================================================
// Degradation
// =============================================================================

#[tokio::test]
async fn test_failing_generator_degrades_to_explanation() {
    let generator = Arc::new(BrokenGenerator::default());
    let engine = engine(ProviderRegistry::new().with_text_generator(generator.clone()));

    let outcome = engine
        .coordinate(&Request::new("What is quantum computing?"))
        .await
        .unwrap();
    let result = &outcome.result;

    assert!(result.success);
    assert!(result.degraded);
    assert!(!result.intent.ai_powered);
    assert_eq!(result.intent.primary, Category::Research);
    assert_eq!(result.processing_stats.failed, 1);
    assert!(outcome.answer.starts_with("I couldn't complete this request."));
    assert!(outcome.answer.contains("session crashed"));
    // classification attempt plus the research dispatch
    assert_eq!(generator.calls.get(), 2);
}

#[tokio::test]
async fn test_missing_provider_reports_hint() {
    let engine = engine(ProviderRegistry::new());

    let outcome = engine
        .coordinate(&Request::new("Write an email to my landlord"))
        .await
        .unwrap();

    assert!(outcome.result.degraded);
    assert_eq!(outcome.result.intent.primary, Category::Write);
    assert!(outcome.answer.contains("PROVIDER/UNAVAILABLE/writer"));
    assert!(outcome.answer.contains("To fix this:"));
}

// =============================================================================
// Model tiers
// =============================================================================

#[tokio::test]
async fn test_model_plan_drives_execution() {
    let f = fixture();
    let generator = Arc::new(ScriptedGenerator {
        calls: Calls::default(),
        classification: r#"{"primary":"summarize","secondary":["write"],"confidence":0.9}"#
            .to_string(),
        plan: r#"```json
{
  "primary": "summarize",
  "isMultiStep": true,
  "executionType": "sequential",
  "executionPlan": [
    {"step": 2, "agent": "writer", "action": "write_content",
     "input": "page_summary", "output": "post"},
    {"step": 1, "agent": "summarizer", "action": "summarize_page",
     "input": "current_page", "output": "page_summary"}
  ],
  "reasoning": "summarize, then draft"
}
```"#
            .to_string(),
    });
    let engine = engine(f.registry.clone().with_text_generator(generator.clone()));

    let outcome = engine
        .coordinate(&page_request("Summarize this and then write a blog post about it"))
        .await
        .unwrap();
    let result = &outcome.result;

    assert!(result.intent.ai_powered);
    assert!(result.intent.is_multi_step);
    assert_eq!(result.execution_type, ExecutionType::Sequential);
    let steps: Vec<u32> = result.results.iter().map(|r| r.step).collect();
    assert_eq!(steps, vec![1, 2]);
    assert_eq!(f.summarizer.calls.get(), 1);
    assert_eq!(f.writer.calls.get(), 1);
    assert!(outcome.answer.starts_with("draft: "));
    assert_eq!(generator.calls.get(), 2);
}

#[tokio::test]
async fn test_plan_reports_source() {
    let engine = engine(fixture().registry);

    let decision = engine.plan(&Request::new("Summarize this in French")).await;
    assert!(decision.is_multi_step);
    assert_eq!(decision.source, PlanSource::Pattern);

    let decision = engine.plan(&Request::new("Translate this to Spanish")).await;
    assert!(!decision.is_multi_step);
    assert!(decision.plan.is_none());
}

// =============================================================================
// Progress and configuration
// =============================================================================

#[tokio::test]
async fn test_progress_phases_in_order() {
    let engine = engine(fixture().registry);
    let (sink, mut events) = ProgressSink::channel();

    let outcome = engine
        .coordinate_with_progress(&page_request("Give me a brief overview in German"), sink)
        .await
        .unwrap();

    let mut phases = Vec::new();
    while let Ok(event) = events.try_recv() {
        assert_eq!(event.trace_id, outcome.result.trace_id);
        phases.push(event.phase);
    }

    assert_eq!(phases.first(), Some(&Phase::Received));
    assert_eq!(phases[1], Phase::Classifying);
    assert_eq!(phases[2], Phase::Planning);
    assert_eq!(
        phases.iter().filter(|p| matches!(p, Phase::StepFinished { success: true, .. })).count(),
        2
    );
    assert_eq!(phases.last(), Some(&Phase::Done { degraded: false }));
}

#[tokio::test]
async fn test_trace_ids_are_per_call() {
    let engine = engine(fixture().registry);
    let request = page_request("Translate this to Spanish");

    let (a, b) = tokio::join!(engine.coordinate(&request), engine.coordinate(&request));
    assert_ne!(a.unwrap().result.trace_id, b.unwrap().result.trace_id);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = EngineConfig {
        default_language: "english".to_string(),
        ..EngineConfig::default()
    };
    let err = CoordinationEngine::new(ProviderRegistry::new(), config).err().unwrap();
    assert!(matches!(err, CoordError::Config(_)));
}

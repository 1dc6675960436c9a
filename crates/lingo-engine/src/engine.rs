use lingo_core::{
    CallContext, CoordError, CoordinationOutcome, CoordinationResult, EngineConfig,
    ExecutionPlan, ExecutionStep, ExecutionType, Intent, Phase, ProcessingStats, ProgressSink,
    ProviderRegistry, Request, StepResult,
};
use lingo_exec::{execute_step, resolve_input, single_step, CapabilityDispatcher, Payload, PlanExecutor};
use lingo_in::{normalize, validate_request, CompiledGrammar, IntentClassifier};
use lingo_out::{load_formatter, ResultFormatter};
use lingo_plan::{needs_planning, PlanDecision, PlanSynthesizer};
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};

/// Classifier, synthesizer, executor and formatter wired to one provider
/// registry. Holds no per-call state; share it behind an `Arc`.
pub struct CoordinationEngine {
    config: EngineConfig,
    classifier: IntentClassifier,
    synthesizer: PlanSynthesizer,
    dispatcher: Arc<CapabilityDispatcher>,
    executor: PlanExecutor,
    formatter: ResultFormatter,
}

impl CoordinationEngine {
    /// Build an engine. Fails only on invalid configuration, grammar, or
    /// templates.
    pub fn new(registry: ProviderRegistry, config: EngineConfig) -> Result<Self, CoordError> {
        config.validate()?;

        let grammar = match &config.grammar_path {
            Some(path) => CompiledGrammar::load(path)?,
            None => CompiledGrammar::builtin(),
        };
        let formatter = load_formatter(config.templates_path.as_deref())?;

        let text = registry.text_generator().cloned();
        let classifier = IntentClassifier::new(text.clone(), Arc::new(grammar), &config);
        let synthesizer = PlanSynthesizer::new(text, &config);
        let dispatcher = Arc::new(CapabilityDispatcher::new(
            registry,
            config.default_language.clone(),
        ));
        let executor = PlanExecutor::new(Arc::clone(&dispatcher));

        debug!(?config, registry = ?dispatcher.registry(), "coordination engine ready");

        Ok(Self {
            config,
            classifier,
            synthesizer,
            dispatcher,
            executor,
            formatter,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ProviderRegistry {
        self.dispatcher.registry()
    }

    /// Classify, plan if needed, execute and format.
    pub async fn coordinate(&self, request: &Request) -> Result<CoordinationOutcome, CoordError> {
        self.run(request, CallContext::new()).await
    }

    /// Same as `coordinate`, reporting each phase on `progress`.
    pub async fn coordinate_with_progress(
        &self,
        request: &Request,
        progress: ProgressSink,
    ) -> Result<CoordinationOutcome, CoordError> {
        self.run(request, CallContext::new().with_progress(progress))
            .await
    }

    pub async fn classify_intent(&self, request: &Request) -> Intent {
        self.classifier.classify(request).await
    }

    pub async fn synthesize_plan(&self, request: &Request) -> Option<ExecutionPlan> {
        self.synthesizer.synthesize_plan(request).await
    }

    /// Full planning decision, including which tier produced it
    pub async fn plan(&self, request: &Request) -> PlanDecision {
        self.synthesizer.synthesize(request).await
    }

    pub async fn execute_step(
        &self,
        step: &ExecutionStep,
        input: Payload<'_>,
        request: &Request,
        ctx: &CallContext,
    ) -> StepResult {
        execute_step(&self.dispatcher, step, input, request, ctx).await
    }

    pub fn format(&self, result: &CoordinationResult) -> String {
        self.formatter.format(result)
    }

    async fn run(
        &self,
        request: &Request,
        ctx: CallContext,
    ) -> Result<CoordinationOutcome, CoordError> {
        let span = info_span!("coordinate", trace_id = %ctx.trace_id);
        async move {
            ctx.emit(Phase::Received);
            validate_request(&request.text)?;

            ctx.emit(Phase::Classifying);
            let mut intent = self.classifier.classify(request).await;

            let mut result = match self.plan_for(request, &intent, &ctx).await {
                Some(plan) => {
                    intent.is_multi_step = true;
                    self.executor.execute(&plan, request, &intent, &ctx).await
                }
                None => self.run_single(request, &intent, &ctx).await,
            };

            if !result.success {
                // every tier failed: answer with an explanation instead
                result.success = true;
                result.degraded = true;
            }
            result.elapsed_ms = ctx.elapsed_ms();

            let answer = self.formatter.format(&result);
            ctx.emit(Phase::Done {
                degraded: result.degraded,
            });
            info!(
                primary = %result.intent.primary,
                ai_powered = result.intent.ai_powered,
                execution_type = result.execution_type.as_str(),
                succeeded = result.processing_stats.succeeded,
                degraded = result.degraded,
                elapsed_ms = result.elapsed_ms,
                "coordination finished"
            );

            Ok::<_, CoordError>(CoordinationOutcome { result, answer })
        }
        .instrument(span)
        .await
    }

    async fn plan_for(
        &self,
        request: &Request,
        intent: &Intent,
        ctx: &CallContext,
    ) -> Option<ExecutionPlan> {
        if !needs_planning(intent, &normalize(&request.text)) {
            return None;
        }

        ctx.emit(Phase::Planning);
        let decision = self.synthesizer.synthesize(request).await;
        debug!(source = ?decision.source, multi = decision.is_multi_step, "plan decision");
        decision.plan.filter(|_| decision.is_multi_step)
    }

    async fn run_single(
        &self,
        request: &Request,
        intent: &Intent,
        ctx: &CallContext,
    ) -> CoordinationResult {
        let step = single_step(intent, request);
        ctx.emit(Phase::Dispatching {
            agent: step.agent(),
        });

        let input = resolve_input(&step.input, request, None);
        let results = vec![execute_step(&self.dispatcher, &step, input, request, ctx).await];
        let stats = ProcessingStats::from_results(&results);

        CoordinationResult {
            trace_id: ctx.trace_id.clone(),
            intent: intent.clone(),
            plan: None,
            success: stats.succeeded > 0,
            degraded: false,
            execution_type: ExecutionType::Single,
            processing_stats: stats,
            results,
            started_at: ctx.started_at,
            elapsed_ms: ctx.elapsed_ms(),
        }
    }
}

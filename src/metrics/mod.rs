use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

// ============================================================================
// Metrics Module - Prometheus metrics for the admin workflows
// ============================================================================
//
// Provides metrics for:
// - Picker fetches (per entity, per outcome) and discarded stale responses
// - Wizard transitions blocked by incomplete steps
// - Submissions (per draft kind, per outcome) and their duration
// - Compensating deletes after partial order saves
//
// The registry is owned by the AdminContext; render() produces the text
// exposition format for whatever host embeds the dashboard core.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Picker Metrics
    pub picker_fetches: IntCounterVec,
    pub picker_stale_responses: IntCounterVec,

    // Wizard Metrics
    pub wizard_blocked_transitions: IntCounterVec,

    // Submission Metrics
    pub submissions: IntCounterVec,
    pub submission_duration: HistogramVec,
    pub compensations: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Picker Metrics
        let picker_fetches = IntCounterVec::new(
            Opts::new("picker_fetches_total", "Picker page fetches by entity and outcome"),
            &["entity", "outcome"],
        )?;
        registry.register(Box::new(picker_fetches.clone()))?;

        let picker_stale_responses = IntCounterVec::new(
            Opts::new(
                "picker_stale_responses_total",
                "Picker responses discarded because a newer request or a close superseded them",
            ),
            &["entity"],
        )?;
        registry.register(Box::new(picker_stale_responses.clone()))?;

        // Wizard Metrics
        let wizard_blocked_transitions = IntCounterVec::new(
            Opts::new(
                "wizard_blocked_transitions_total",
                "Forward wizard transitions rejected by the step completeness check",
            ),
            &["kind", "step"],
        )?;
        registry.register(Box::new(wizard_blocked_transitions.clone()))?;

        // Submission Metrics
        let submissions = IntCounterVec::new(
            Opts::new("submissions_total", "Orchestrated submissions by draft kind and outcome"),
            &["kind", "outcome"],
        )?;
        registry.register(Box::new(submissions.clone()))?;

        let submission_duration = HistogramVec::new(
            HistogramOpts::new("submission_duration_seconds", "Orchestrated submission duration")
                .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["kind"],
        )?;
        registry.register(Box::new(submission_duration.clone()))?;

        let compensations = IntCounterVec::new(
            Opts::new("compensations_total", "Compensating header deletes by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(compensations.clone()))?;

        Ok(Self {
            registry,
            picker_fetches,
            picker_stale_responses,
            wizard_blocked_transitions,
            submissions,
            submission_duration,
            compensations,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn record_picker_fetch(&self, entity: &str, success: bool) {
        let outcome = if success { "ok" } else { "error" };
        self.picker_fetches.with_label_values(&[entity, outcome]).inc();
    }

    pub fn record_stale_response(&self, entity: &str) {
        self.picker_stale_responses.with_label_values(&[entity]).inc();
    }

    pub fn record_blocked_transition(&self, kind: &str, step: &str) {
        self.wizard_blocked_transitions.with_label_values(&[kind, step]).inc();
    }

    pub fn record_submission(&self, kind: &str, outcome: &str, duration_secs: f64) {
        self.submissions.with_label_values(&[kind, outcome]).inc();
        self.submission_duration.with_label_values(&[kind]).observe(duration_secs);
    }

    pub fn record_compensation(&self, success: bool) {
        let outcome = if success { "deleted" } else { "failed" };
        self.compensations.with_label_values(&[outcome]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        metrics.record_picker_fetch("color", true);
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_record_picker_fetch() {
        let metrics = Metrics::new().unwrap();
        metrics.record_picker_fetch("color", true);
        metrics.record_picker_fetch("color", true);
        metrics.record_picker_fetch("size", false);

        assert_eq!(metrics.picker_fetches.with_label_values(&["color", "ok"]).get(), 2);
        assert_eq!(metrics.picker_fetches.with_label_values(&["size", "error"]).get(), 1);
    }

    #[test]
    fn test_record_submission() {
        let metrics = Metrics::new().unwrap();
        metrics.record_submission("order", "success", 0.12);
        metrics.record_submission("order", "header_failed", 0.02);

        assert_eq!(metrics.submissions.with_label_values(&["order", "success"]).get(), 1);
        assert_eq!(
            metrics.submission_duration.with_label_values(&["order"]).get_sample_count(),
            2
        );
    }

    #[test]
    fn test_render_text_exposition() {
        let metrics = Metrics::new().unwrap();
        metrics.record_compensation(true);

        let text = metrics.render().unwrap();
        assert!(text.contains("compensations_total{outcome=\"deleted\"} 1"));
    }
}

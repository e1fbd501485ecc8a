use crate::report::SkipStage;
use metrics::counter;

pub struct DiscoveryTelemetry;

impl DiscoveryTelemetry {
    pub fn record_accounts(strategy: &'static str, count: usize) {
        counter!("discovery_accounts_total", "strategy" => strategy).increment(count as u64);
    }

    pub fn record_skipped(stage: SkipStage) {
        counter!("discovery_skipped_total", "stage" => stage.as_str()).increment(1);
    }

    pub fn record_enrichment_failure() {
        counter!("discovery_enrichment_failures_total").increment(1);
    }
}

use crate::core::Totals;
use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{
        counter::Counter,
        family::Family,
        histogram::{exponential_buckets, Histogram},
    },
    registry::{Registry, Unit},
};
use tokio::time;

#[derive(Clone, Debug)]
pub struct AnalyticsMetrics {
    requests: Family<ResultLabels, Counter>,
    records: Family<CategoryLabels, Counter>,
    duration: Histogram,
}

#[derive(Clone, Hash, PartialEq, Eq, EncodeLabelSet, Debug)]
struct ResultLabels {
    result: &'static str,
}

#[derive(Clone, Hash, PartialEq, Eq, EncodeLabelSet, Debug)]
struct CategoryLabels {
    category: &'static str,
}

// === impl AnalyticsMetrics ===

impl AnalyticsMetrics {
    pub fn register(reg: &mut Registry) -> Self {
        let requests = Family::<ResultLabels, Counter>::default();
        reg.register(
            "requests",
            "Total number of traffic analytics requests, by result",
            requests.clone(),
        );

        let records = Family::<CategoryLabels, Counter>::default();
        reg.register(
            "records",
            "Total number of classification records produced, by traffic category",
            records.clone(),
        );

        // 1ms to ~16s.
        let duration = Histogram::new(exponential_buckets(0.001, 2.0, 15));
        reg.register_with_unit(
            "duration",
            "Time taken to fetch a snapshot and classify it",
            Unit::Seconds,
            duration.clone(),
        );

        Self {
            requests,
            records,
            duration,
        }
    }

    pub(crate) fn analyzed(&self, totals: &Totals, elapsed: time::Duration) {
        self.requests
            .get_or_create(&ResultLabels { result: "ok" })
            .inc();
        for (category, count) in [
            ("base", totals.base_count),
            ("canary", totals.canary_count),
            ("no_rule", totals.no_rule_count),
        ] {
            self.records
                .get_or_create(&CategoryLabels { category })
                .inc_by(count as u64);
        }
        self.duration.observe(elapsed.as_secs_f64());
    }

    pub(crate) fn fetch_failed(&self, elapsed: time::Duration) {
        self.requests
            .get_or_create(&ResultLabels {
                result: "fetch_error",
            })
            .inc();
        self.duration.observe(elapsed.as_secs_f64());
    }

    pub(crate) fn bad_request(&self) {
        self.requests
            .get_or_create(&ResultLabels {
                result: "bad_request",
            })
            .inc();
    }
}

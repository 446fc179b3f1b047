use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

#[derive(Clone, Debug)]
pub struct IndexMetrics {
    translations: Family<TranslationLabels, Counter>,
    deletes: Counter,
    resyncs: Counter,
}

#[derive(Clone, Debug)]
pub struct ControllerMetrics {
    writes: Family<WriteLabels, Counter>,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct TranslationLabels {
    result: &'static str,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct WriteLabels {
    op: &'static str,
    result: &'static str,
}

// === impl IndexMetrics ===

impl IndexMetrics {
    pub fn register(prom: &mut Registry) -> Self {
        let translations = Family::default();
        prom.register(
            "index_translations",
            "Count of GRPCRoute translations by result",
            translations.clone(),
        );

        let deletes = Counter::default();
        prom.register(
            "index_deletes",
            "Count of GRPCRoute deletions observed",
            deletes.clone(),
        );

        let resyncs = Counter::default();
        prom.register(
            "index_resyncs",
            "Count of HTTPRoute upserts re-sent by periodic resync",
            resyncs.clone(),
        );

        Self {
            translations,
            deletes,
            resyncs,
        }
    }

    pub(crate) fn translated(&self) {
        self.translations
            .get_or_create(&TranslationLabels { result: "ok" })
            .inc();
    }

    pub(crate) fn translation_failed(&self) {
        self.translations
            .get_or_create(&TranslationLabels { result: "invalid" })
            .inc();
    }

    pub(crate) fn deleted(&self) {
        self.deletes.inc();
    }

    pub(crate) fn resynced(&self, routes: usize) {
        self.resyncs.inc_by(routes as u64);
    }
}

// === impl ControllerMetrics ===

impl ControllerMetrics {
    pub fn register(prom: &mut Registry) -> Self {
        let writes = Family::default();
        prom.register(
            "controller_writes",
            "Count of HTTPRoute writes by operation and result",
            writes.clone(),
        );
        Self { writes }
    }

    pub(crate) fn write(&self, op: &'static str, result: &'static str) {
        self.writes.get_or_create(&WriteLabels { op, result }).inc();
    }
}

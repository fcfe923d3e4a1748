use crate::metrics::{scoped, Metric};

/// Ordered metrics for one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusLine {
    metrics: Vec<Metric>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, metric: Metric) -> &mut Self {
        self.metrics.push(metric);
        self
    }

    /// Pushes `metric` followed by a separator.
    pub fn push_separated(&mut self, metric: Metric) -> &mut Self {
        self.push(metric).push(Metric::Separator)
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Renders every metric left to right, each wrapped in its colour escape.
    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(512);
        for metric in &self.metrics {
            scoped(&mut out, metric.color(), |o| metric.render(o));
        }
        out
    }
}

impl FromIterator<Metric> for StatusLine {
    fn from_iter<I: IntoIterator<Item = Metric>>(iter: I) -> Self {
        Self {
            metrics: iter.into_iter().collect(),
        }
    }
}

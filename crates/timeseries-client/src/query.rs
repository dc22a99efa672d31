use crate::types::Timestamp;

/// Builder for Flux read queries against a single bucket.
///
/// The generated pipeline is `from` → optional `range` → zero or more
/// equality `filter` stages → windowed mean aggregation → `yield`. Filters
/// are emitted in insertion order.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    project: String,
    filters: Vec<(String, String)>,
    start_time: Option<Timestamp>,
    end_time: Option<Timestamp>,
    precision: String,
}

impl QueryBuilder {
    /// Create a builder for the given bucket, with a 5 minute aggregation
    /// window
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            filters: Vec::new(),
            start_time: None,
            end_time: None,
            precision: "5m".to_string(),
        }
    }

    /// Add an equality filter on a tag or field column
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Bound the query from below (inclusive)
    pub fn start_time(mut self, start: impl Into<Timestamp>) -> Self {
        self.start_time = Some(start.into());
        self
    }

    /// Bound the query from above (exclusive)
    pub fn end_time(mut self, end: impl Into<Timestamp>) -> Self {
        self.end_time = Some(end.into());
        self
    }

    /// Override the aggregation window (e.g. "1m", "1h", "1d")
    pub fn precision(mut self, precision: impl Into<String>) -> Self {
        self.precision = precision.into();
        self
    }

    /// Assemble the Flux query string
    pub fn build(&self) -> String {
        let mut query = format!("from(bucket: \"{}\")\n", self.project);

        match (&self.start_time, &self.end_time) {
            (Some(start), Some(end)) => {
                query.push_str(&format!(
                    "  |> range(start: {}, stop: {})\n",
                    start.to_rfc3339(),
                    end.to_rfc3339()
                ));
            }
            (Some(start), None) => {
                query.push_str(&format!("  |> range(start: {})\n", start.to_rfc3339()));
            }
            (None, Some(end)) => {
                query.push_str(&format!("  |> range(stop: {})\n", end.to_rfc3339()));
            }
            // No bounds: the store's default range applies
            (None, None) => {}
        }

        for (field, value) in &self.filters {
            query.push_str(&format!(
                "  |> filter(fn: (r) => r[\"{}\"] == \"{}\")\n",
                field, value
            ));
        }

        query.push_str(&format!(
            "  |> aggregateWindow(every: {}, fn: mean, createEmpty: true)\n",
            self.precision
        ));
        query.push_str("  |> yield(name: \"mean\")\n");

        query
    }
}

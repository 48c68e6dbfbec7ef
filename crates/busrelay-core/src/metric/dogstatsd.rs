//! DogStatsD line codec.
//!
//! One metric per line: `<prefix><name>:<value>|<type>[|#tag1,tag2]`.
//! Global tags precede call tags. Characters reserved by the protocol are
//! replaced with `_` so a tag value can never split a line.

use std::fmt::Write;

/// Metric type, rendered as the DogStatsD type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Count,
    Gauge,
    Histogram,
    Timing,
    Distribution,
}

impl MetricKind {
    pub fn type_code(self) -> &'static str {
        match self {
            MetricKind::Count => "c",
            MetricKind::Gauge => "g",
            MetricKind::Histogram => "h",
            MetricKind::Timing => "ms",
            MetricKind::Distribution => "d",
        }
    }

    fn from_type_code(code: &str) -> Option<Self> {
        match code {
            "c" => Some(MetricKind::Count),
            "g" => Some(MetricKind::Gauge),
            "h" => Some(MetricKind::Histogram),
            "ms" => Some(MetricKind::Timing),
            "d" => Some(MetricKind::Distribution),
            _ => None,
        }
    }
}

/// A single emission. Not retained after it is encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    pub kind: MetricKind,
    /// `key:value` strings, in emission order.
    pub tags: Vec<String>,
}

impl Metric {
    pub fn new(kind: MetricKind, name: impl Into<String>, value: f64, tags: &[String]) -> Self {
        Self {
            name: name.into(),
            value,
            kind,
            tags: tags.to_vec(),
        }
    }

    /// Tag value for `key`, if the metric carries `key:<value>`.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.iter().find_map(|t| {
            t.split_once(':')
                .filter(|(k, _)| *k == key)
                .map(|(_, v)| v)
        })
    }
}

fn sanitize_name(name: &str) -> String {
    name.replace([':', '|', '@', '\n'], "_")
}

fn sanitize_tag(tag: &str) -> String {
    tag.replace(['|', ',', '#', '\n'], "_")
}

fn format_value(v: f64) -> Option<String> {
    if !v.is_finite() {
        return None;
    }
    if v.fract() == 0.0 && v.abs() < 1e15 {
        Some(format!("{}", v as i64))
    } else {
        Some(format!("{v}"))
    }
}

/// Encode one metric. Returns `None` for non-finite values.
pub fn encode_line(prefix: &str, metric: &Metric, global_tags: &[String]) -> Option<String> {
    let Some(value) = format_value(metric.value) else {
        tracing::trace!(name = %metric.name, "dropping non-finite metric value");
        return None;
    };

    let mut out = String::with_capacity(64);
    let _ = write!(
        out,
        "{}{}:{}|{}",
        prefix,
        sanitize_name(&metric.name),
        value,
        metric.kind.type_code()
    );

    let mut tags = global_tags.iter().chain(metric.tags.iter()).peekable();
    if tags.peek().is_some() {
        out.push_str("|#");
        let joined = tags.map(|t| sanitize_tag(t)).collect::<Vec<_>>().join(",");
        out.push_str(&joined);
    }
    Some(out)
}

/// Decode a line produced by [`encode_line`]. The prefix stays part of the name.
///
/// Sample-rate sections (`|@0.5`) are skipped.
pub fn decode_line(line: &str) -> Option<Metric> {
    let (name, rest) = line.split_once(':')?;
    let mut sections = rest.split('|');
    let value: f64 = sections.next()?.parse().ok()?;
    let kind = MetricKind::from_type_code(sections.next()?)?;

    let mut tags = Vec::new();
    for s in sections {
        if let Some(list) = s.strip_prefix('#') {
            tags.extend(list.split(',').filter(|t| !t.is_empty()).map(str::to_string));
        }
    }

    Some(Metric {
        name: name.to_string(),
        value,
        kind,
        tags,
    })
}

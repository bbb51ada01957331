use crate::StatsdError;
use std::fmt;
use std::str::FromStr;

/// The StatsD metric type of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// `c`
    Counter,
    /// `g`
    Gauge,
    /// `s`
    Set,
    /// `ms`
    Timing,
    /// `h`
    Histogram,
}

impl MetricKind {
    /// Value of the `metric_type` tag.
    #[must_use]
    pub fn tag_value(self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
            Self::Set => "set",
            Self::Timing => "timing",
            Self::Histogram => "histogram",
        }
    }

    /// Whether a leading `+`/`-` is accepted.
    #[must_use]
    pub fn accepts_sign(self) -> bool {
        matches!(self, Self::Counter | Self::Gauge)
    }
}

impl FromStr for MetricKind {
    type Err = StatsdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "c" => Self::Counter,
            "g" => Self::Gauge,
            "s" => Self::Set,
            "ms" => Self::Timing,
            "h" => Self::Histogram,
            _ => {
                return Err(StatsdError::UnsupportedType {
                    kind: s.to_owned(),
                })
            }
        })
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_kinds() {
        for (s, kind, tag) in [
            ("c", MetricKind::Counter, "counter"),
            ("g", MetricKind::Gauge, "gauge"),
            ("s", MetricKind::Set, "set"),
            ("ms", MetricKind::Timing, "timing"),
            ("h", MetricKind::Histogram, "histogram"),
        ] {
            assert_eq!(s.parse::<MetricKind>().unwrap(), kind);
            assert_eq!(kind.tag_value(), tag);
        }
    }

    #[test]
    fn unknown_kind() {
        assert_eq!(
            "e".parse::<MetricKind>().unwrap_err(),
            StatsdError::UnsupportedType { kind: "e".into() }
        );
        assert!("d".parse::<MetricKind>().is_err());
    }
}

//! Host subset routing: which contiguous slice of the shuffled job list the
//! current machine submits.

use indexmap::IndexMap;
use se_types::SubsetSpec;
use std::ops::Range;
use tracing::debug;

/// Half-open `[start, end)` bounds into the shuffled job list. A missing
/// bound means "from the beginning" / "to the end"; a negative one counts
/// back from the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteBounds {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl RouteBounds {
    /// The route of a host that runs nothing.
    pub const EMPTY: Self = Self {
        start: Some(0),
        end: Some(0),
    };

    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        Self { start, end }
    }

    /// Concrete index range for a list of `len` jobs. Negative bounds are
    /// taken from the end, bounds outside the list are clamped and inverted
    /// bounds give an empty range.
    pub fn resolve(&self, len: usize) -> Range<usize> {
        let start = self.start.map_or(0, |b| clamp_index(b, len));
        let end = self.end.map_or(len, |b| clamp_index(b, len));
        start..end.max(start)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.resolve(items.len())]
    }
}

fn clamp_index(bound: i64, len: usize) -> usize {
    if bound < 0 {
        let from_end = usize::try_from(bound.unsigned_abs()).unwrap_or(usize::MAX);
        len.saturating_sub(from_end)
    } else {
        usize::try_from(bound).map_or(len, |b| b.min(len))
    }
}

/// Compute the bounds assigned to `current_host` out of `job_count` jobs.
pub fn route(job_count: usize, spec: &SubsetSpec, current_host: &str) -> RouteBounds {
    match spec {
        SubsetSpec::Range(start, end) => RouteBounds::new(*start, *end),
        SubsetSpec::Weighted(hosts) => route_weighted(job_count, hosts, current_host),
    }
}

/// Weighted-host routing.
///
/// Entries are scanned in table order and the first key that is a
/// *substring* of `current_host` wins, so a short key like `"al"` also
/// claims `"alpha01"`. Order the table from most to least specific.
///
/// Weights are taken as given. A table that does not sum to 1 yields
/// overlapping or gapped ranges across hosts; nothing here detects that.
/// A host matching no entry runs nothing.
pub fn route_weighted(
    job_count: usize,
    hosts: &IndexMap<String, f64>,
    current_host: &str,
) -> RouteBounds {
    let mut cumulative = 0.0_f64;

    for (name, &weight) in hosts {
        let previous = cumulative;
        cumulative += weight;

        if !current_host.contains(name.as_str()) {
            continue;
        }

        if weight == 0.0 {
            debug!(host = %current_host, entry = %name, "Host has zero weight");
            return RouteBounds::EMPTY;
        }

        // `as i64` truncates toward zero; negative weights yield
        // from-the-end bounds.
        let start = if previous == 1.0 {
            None
        } else {
            Some((previous * job_count as f64) as i64)
        };
        let end = if cumulative == 1.0 {
            None
        } else {
            Some((cumulative * job_count as f64) as i64)
        };

        debug!(
            host = %current_host,
            entry = %name,
            from = previous,
            to = cumulative,
            "Matched weighted host entry"
        );
        return RouteBounds::new(start, end);
    }

    debug!(host = %current_host, "No weighted host entry matches; routing nothing");
    RouteBounds::EMPTY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, f64)]) -> SubsetSpec {
        SubsetSpec::weighted(entries.iter().map(|(k, w)| (*k, *w)))
    }

    #[test]
    fn explicit_range_passes_through() {
        let spec = SubsetSpec::range(Some(5), None);
        assert_eq!(route(100, &spec, "anything"), RouteBounds::new(Some(5), None));

        let spec = SubsetSpec::range(None, Some(3));
        assert_eq!(route(100, &spec, "anything"), RouteBounds::new(None, Some(3)));
    }

    #[test]
    fn weighted_routing_partitions_the_list() {
        let spec = table(&[("alpha", 0.25), ("beta", 0.75)]);

        let alpha = route(100, &spec, "alpha-node01");
        assert_eq!(alpha, RouteBounds::new(Some(0), Some(25)));
        assert_eq!(alpha.resolve(100), 0..25);

        let beta = route(100, &spec, "login.beta.cluster");
        assert_eq!(beta, RouteBounds::new(Some(25), None));
        assert_eq!(beta.resolve(100), 25..100);
    }

    #[test]
    fn weighted_ranges_cover_every_job_once() {
        let spec = table(&[("a", 0.5), ("b", 0.25), ("c", 0.25)]);
        let jobs: Vec<usize> = (0..37).collect();

        let mut seen: Vec<usize> = ["a", "b", "c"]
            .iter()
            .flat_map(|host| route(jobs.len(), &spec, host).slice(&jobs).to_vec())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, jobs);
    }

    #[test]
    fn zero_weight_host_gets_nothing() {
        let spec = table(&[("alpha", 0.5), ("idle", 0.0), ("beta", 0.5)]);
        assert_eq!(route(100, &spec, "idle-box"), RouteBounds::EMPTY);

        let head = table(&[("idle", 0.0), ("beta", 1.0)]);
        assert_eq!(route(100, &head, "idle"), RouteBounds::EMPTY);
        assert!(route(100, &head, "idle").resolve(100).is_empty());
    }

    #[test]
    fn unmatched_host_gets_nothing() {
        let spec = table(&[("alpha", 0.25), ("beta", 0.75)]);
        assert_eq!(route(100, &spec, "gamma"), RouteBounds::EMPTY);

        let empty = SubsetSpec::weighted(Vec::<(&str, f64)>::new());
        assert_eq!(route(100, &empty, "gamma"), RouteBounds::EMPTY);
    }

    #[test]
    fn first_substring_match_wins() {
        let spec = table(&[("al", 0.5), ("alpha", 0.5)]);
        assert_eq!(route(10, &spec, "alpha"), RouteBounds::new(Some(0), Some(5)));
    }

    #[test]
    fn start_is_open_when_previous_weights_reach_one() {
        let spec = table(&[("full", 1.0), ("late", 0.5)]);
        let bounds = route(10, &spec, "late");
        assert_eq!(bounds, RouteBounds::new(None, Some(15)));
    }

    #[test]
    fn resolve_clamps_like_a_slice() {
        assert_eq!(RouteBounds::new(Some(5), Some(50)).resolve(10), 5..10);
        assert_eq!(RouteBounds::new(Some(8), Some(3)).resolve(10), 8..8);
        assert_eq!(RouteBounds::new(Some(20), None).resolve(10), 10..10);
        assert_eq!(RouteBounds::default().resolve(4), 0..4);

        let jobs = [1, 2, 3, 4];
        assert_eq!(RouteBounds::new(Some(1), Some(3)).slice(&jobs), &[2, 3]);
        assert!(RouteBounds::EMPTY.slice(&jobs).is_empty());
    }

    #[test]
    fn negative_start_takes_the_tail() {
        let spec = SubsetSpec::range(Some(-10), None);
        let bounds = route(100, &spec, "anything");
        assert_eq!(bounds, RouteBounds::new(Some(-10), None));
        assert_eq!(bounds.resolve(100), 90..100);
        assert_eq!(bounds.resolve(4), 0..4);

        let jobs = [1, 2, 3, 4, 5];
        assert_eq!(RouteBounds::new(Some(-2), None).slice(&jobs), &[4, 5]);
    }

    #[test]
    fn negative_end_drops_the_tail() {
        assert_eq!(RouteBounds::new(None, Some(-3)).resolve(10), 0..7);
        assert_eq!(RouteBounds::new(Some(2), Some(-3)).resolve(10), 2..7);
        assert_eq!(RouteBounds::new(Some(-3), Some(-5)).resolve(10), 7..7);
        assert_eq!(RouteBounds::new(None, Some(-20)).resolve(10), 0..0);
        assert_eq!(RouteBounds::new(Some(i64::MIN), Some(i64::MAX)).resolve(3), 0..3);
    }
}

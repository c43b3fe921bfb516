use crate::types::TimelineEvent;
use crate::validation::Pagination;
use std::collections::HashSet;

/// Exact-match filters plus the requested window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub kind: Option<String>,
    pub source: Option<String>,
    pub page: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    pub events: Vec<TimelineEvent>,
    pub total: usize,
    pub has_more: bool,
}

/// Filters, orders and windows the merged events.
///
/// Steps run in a fixed order: ids are made unique, the `type` filter and
/// then the `source` filter are applied, the remainder is stable-sorted
/// newest first, `total` is taken, and finally `[offset, offset + limit)` is
/// sliced out.
pub fn assemble(mut events: Vec<TimelineEvent>, query: &EventQuery) -> Assembled {
    dedupe_ids(&mut events);

    if let Some(kind) = query.kind.as_deref() {
        events.retain(|event| event.kind.as_str() == kind);
    }
    if let Some(source) = query.source.as_deref() {
        events.retain(|event| event.source == source);
    }

    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let total = events.len();
    let Pagination { limit, offset } = query.page;
    let has_more = offset.saturating_add(limit) < total;
    let events = events.into_iter().skip(offset).take(limit).collect();

    Assembled {
        events,
        total,
        has_more,
    }
}

/// Suffixes repeated ids with `-2`, `-3`, ... in encounter order.
fn dedupe_ids(events: &mut [TimelineEvent]) {
    let mut taken: HashSet<String> = HashSet::with_capacity(events.len());
    for event in events.iter_mut() {
        if taken.insert(event.id.clone()) {
            continue;
        }
        let mut suffix = 2;
        let unique = loop {
            let candidate = format!("{}-{suffix}", event.id);
            if !taken.contains(&candidate) {
                break candidate;
            }
            suffix += 1;
        };
        taken.insert(unique.clone());
        event.id = unique;
    }
}

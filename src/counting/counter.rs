//! 去重计数器 (Dedup counter)
//!
//! 每个跟踪ID只有两个状态: 未计数 / 已计数一次。
//! 首次进入计数区域时计数, 之后无论离开再进入还是类别改变都不再计数。

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use super::tally::{ClassTally, CountReport};
use crate::detection::TrackId;

/// 计数事件: 每个唯一目标只产生一次
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountEvent {
    pub track_id: TrackId,
    /// 首次满足条件时的类别
    pub class_name: String,
    /// 更新后该类别的计数
    pub class_total: u64,
    /// 更新后的总计数
    pub total: u64,
}

/// 过线计数器
///
/// 已计数ID集合、类别计数、总计数只在 `observe` 中一起修改,
/// 因此 `total == class_tally.sum()` 始终成立。
#[derive(Debug, Clone, Default)]
pub struct LineCounter {
    counted: HashSet<TrackId>,
    class_tally: ClassTally,
    total: u64,
}

impl LineCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 处理一次观测
    ///
    /// 仅在该ID第一次处于区域内的那一帧返回 `Some(CountEvent)`。
    pub fn observe(
        &mut self,
        track_id: TrackId,
        class_name: &str,
        in_zone: bool,
    ) -> Option<CountEvent> {
        if !in_zone || !self.counted.insert(track_id) {
            return None;
        }

        self.total += 1;
        let class_total = self.class_tally.increment(class_name);
        debug_assert_eq!(self.total, self.class_tally.sum());

        Some(CountEvent {
            track_id,
            class_name: class_name.to_string(),
            class_total,
            total: self.total,
        })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn class_tally(&self) -> &ClassTally {
        &self.class_tally
    }

    pub fn is_counted(&self, track_id: TrackId) -> bool {
        self.counted.contains(&track_id)
    }

    pub fn counted_len(&self) -> usize {
        self.counted.len()
    }

    pub fn report(&self) -> CountReport {
        CountReport {
            total: self.total,
            per_class: self.class_tally.clone(),
        }
    }
}

/// 多线程共享的计数器句柄
///
/// 一次 `observe` 持有一把锁, 集合插入与两个计数同时生效。
#[derive(Debug, Clone, Default)]
pub struct SharedLineCounter {
    inner: Arc<Mutex<LineCounter>>,
}

impl SharedLineCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, track_id: TrackId, class_name: &str, in_zone: bool) -> Option<CountEvent> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(track_id, class_name, in_zone)
    }

    pub fn report(&self) -> CountReport {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .report()
    }

    /// 取回内部计数器 (其他句柄仍存活时返回克隆)
    pub fn into_inner(self) -> LineCounter {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => shared
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}

impl From<LineCounter> for SharedLineCounter {
    fn from(counter: LineCounter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(counter)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_counts_on_first_entry_only() {
        let mut counter = LineCounter::new();
        assert_eq!(counter.observe(7, "car", false), None);
        assert!(!counter.is_counted(7));

        let event = counter.observe(7, "car", true).unwrap();
        assert_eq!(
            event,
            CountEvent {
                track_id: 7,
                class_name: "car".into(),
                class_total: 1,
                total: 1,
            }
        );
        assert!(counter.is_counted(7));

        for _ in 0..5 {
            assert_eq!(counter.observe(7, "car", true), None);
        }
        assert_eq!(counter.observe(7, "car", false), None);
        assert_eq!(counter.observe(7, "car", true), None);
        assert_eq!(counter.total(), 1);
        assert_eq!(counter.class_tally().get("car"), 1);
    }

    #[test]
    fn test_class_totals_in_events() {
        let mut counter = LineCounter::new();
        counter.observe(1, "car", true);
        counter.observe(2, "truck", true);
        let event = counter.observe(3, "car", true).unwrap();
        assert_eq!(event.class_total, 2);
        assert_eq!(event.total, 3);
        assert_eq!(counter.counted_len(), 3);
    }

    #[test]
    fn test_relabel_keeps_first_class() {
        let mut counter = LineCounter::new();
        counter.observe(5, "car", true);
        assert_eq!(counter.observe(5, "truck", true), None);
        let report = counter.report();
        assert_eq!(report.total, 1);
        assert_eq!(report.per_class.get("car"), 1);
        assert_eq!(report.per_class.get("truck"), 0);
    }

    #[test]
    fn test_shared_counter_concurrent_writers() {
        let shared = SharedLineCounter::new();
        let classes = ["car", "bus", "truck"];

        let events: Vec<CountEvent> = thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let shared = shared.clone();
                    scope.spawn(move || {
                        let mut events = Vec::new();
                        for id in 0..200u64 {
                            let class = classes[(id % 3) as usize];
                            if let Some(event) = shared.observe(id, class, true) {
                                events.push(event);
                            }
                        }
                        events
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        assert_eq!(events.len(), 200);
        let report = shared.report();
        assert_eq!(report.total, 200);
        assert_eq!(report.per_class.sum(), report.total);

        let counter = shared.into_inner();
        assert_eq!(counter.counted_len(), 200);
    }
}

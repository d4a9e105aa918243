//! 计数结果 (Tallies and final report)

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::ReportError;

/// 按类别计数, 按首次出现的顺序迭代
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassTally {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl ClassTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取值 (不存在视为0) 后加一, 返回新值
    pub fn increment(&mut self, class_name: &str) -> u64 {
        let slot = match self.index.get(class_name) {
            Some(&slot) => slot,
            None => {
                self.entries.push((class_name.to_string(), 0));
                let slot = self.entries.len() - 1;
                self.index.insert(class_name.to_string(), slot);
                slot
            }
        };
        let count = &mut self.entries[slot].1;
        *count += 1;
        *count
    }

    pub fn get(&self, class_name: &str) -> u64 {
        self.index
            .get(class_name)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn sum(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 与顺序无关的视图, 用于比较
    pub fn to_map(&self) -> HashMap<String, u64> {
        self.entries.iter().cloned().collect()
    }
}

impl Serialize for ClassTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, count) in &self.entries {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

/// 运行结束时的只读快照
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct CountReport {
    pub total: u64,
    pub per_class: ClassTally,
}

impl CountReport {
    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 保存最终计数到JSON文件
    pub fn save_json(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

//! 类别名称映射 (class index → label)
//!
//! 默认使用COCO 80类 (build.rs 生成的 phf 表), 也可以从 Ultralytics
//! `data.yaml`、纯文本文件或逗号分隔列表加载。

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

include!(concat!(env!("OUT_DIR"), "/coco_names.rs"));

/// data.yaml 中只关心 `names` 字段, 其余键忽略
#[derive(Debug, Deserialize)]
struct DataYaml {
    #[serde(default)]
    names: Option<YamlNames>,
}

/// `names: [a, b]` / `names: {0: a, 1: b}` 以及对应的块写法
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YamlNames {
    List(Vec<String>),
    Indexed(BTreeMap<u32, String>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClassNames {
    /// COCO 80类
    Coco,
    /// 自定义表 (允许索引不连续)
    Custom(BTreeMap<u32, String>),
}

impl Default for ClassNames {
    fn default() -> Self {
        ClassNames::Coco
    }
}

impl ClassNames {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| (i as u32, name.into()))
            .collect();
        ClassNames::Custom(table)
    }

    /// "car,truck,bus" → {0: car, 1: truck, 2: bus}
    pub fn from_list(list: &str) -> Self {
        Self::from_names(
            list.split(',')
                .map(|s| unquote(s.trim()))
                .filter(|s| !s.is_empty()),
        )
    }

    /// 解析 data.yaml 中的 `names` 字段, 没有该字段时返回 `None`
    ///
    /// 列表写法按顺序编号, 映射写法保留原索引 (允许不连续)
    pub fn parse_data_yaml(text: &str) -> Result<Option<Self>, serde_yaml::Error> {
        let data: DataYaml = serde_yaml::from_str(text)?;
        Ok(data.names.map(|names| match names {
            YamlNames::List(list) => Self::from_names(list),
            YamlNames::Indexed(table) => ClassNames::Custom(table),
        }))
    }

    /// 从文件加载: `.yaml/.yml` 按 data.yaml 解析, 其他按每行一个名称
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ClassNames {
            path: path.display().to_string(),
            source,
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        if is_yaml {
            let parsed =
                Self::parse_data_yaml(&text).map_err(|source| ConfigError::ClassNamesYaml {
                    path: path.display().to_string(),
                    source,
                })?;
            match parsed {
                Some(names) => Ok(names),
                None => {
                    tracing::warn!(
                        "no `names` field in {}, falling back to COCO classes",
                        path.display()
                    );
                    Ok(ClassNames::Coco)
                }
            }
        } else {
            Ok(Self::from_names(
                text.lines().map(str::trim).filter(|line| !line.is_empty()),
            ))
        }
    }

    /// 命令行参数: 存在的文件路径按文件加载, 否则视为逗号分隔列表
    pub fn from_arg(arg: &str) -> Result<Self, ConfigError> {
        let path = Path::new(arg);
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::from_list(arg))
        }
    }

    /// 未知索引返回 `class_<id>`
    pub fn resolve(&self, class_id: u32) -> String {
        let name = match self {
            ClassNames::Coco => COCO_CLASS_NAMES.get(&class_id).map(|s| s.to_string()),
            ClassNames::Custom(table) => table.get(&class_id).cloned(),
        };
        name.unwrap_or_else(|| format!("class_{}", class_id))
    }

    pub fn len(&self) -> usize {
        match self {
            ClassNames::Coco => COCO_CLASS_NAMES.len(),
            ClassNames::Custom(table) => table.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn unquote(s: &str) -> &str {
    s.trim_matches(|c| c == '\'' || c == '"')
}

use crate::error::{MatchingError, MatchingResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// 模型对单条名录文本的预测
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub trail: String,
    pub manufacturer_id: i64,
}

/// 预测模型 (外部协作者)
///
/// 对固定的模型实例应是纯函数。
pub trait PredictionModel: Send + Sync {
    fn predict(&self, text: &str) -> MatchingResult<Prediction>;

    fn module_group(&self, trail: &str) -> Option<String>;

    fn pharmacy_group(&self, trail: &str) -> Option<String>;
}

/// 按需构造模型 (由调用方注入，不使用全局单例)
pub type ModelFactory = Arc<dyn Fn() -> MatchingResult<Arc<dyn PredictionModel>> + Send + Sync>;

/// 基于字典文件的模型
///
/// 文件格式 (JSON):
/// `{"trails": {"<文本>": {"trail": "...", "manufacturer_id": 1}},
///   "module_groups": {"<trail>": "90001"}, "pharmacy_groups": {"<trail>": "7"}}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DictionaryModel {
    #[serde(default)]
    trails: HashMap<String, Prediction>,
    #[serde(default)]
    module_groups: HashMap<String, String>,
    #[serde(default)]
    pharmacy_groups: HashMap<String, String>,
}

impl DictionaryModel {
    pub fn from_json(json: &str) -> MatchingResult<Self> {
        let raw: DictionaryModel = serde_json::from_str(json)
            .map_err(|e| MatchingError::Model(format!("invalid dictionary: {}", e)))?;
        Ok(Self {
            trails: raw
                .trails
                .into_iter()
                .map(|(text, pred)| (normalize(&text), pred))
                .collect(),
            ..raw
        })
    }

    pub fn from_path(path: &Path) -> MatchingResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| MatchingError::Model(format!("cannot read {}: {}", path.display(), e)))?;
        let model = Self::from_json(&json)?;
        tracing::info!(
            "Dictionary model loaded from {}: {} trails, {} module groups, {} pharmacy groups",
            path.display(),
            model.trails.len(),
            model.module_groups.len(),
            model.pharmacy_groups.len()
        );
        Ok(model)
    }

    /// 首次调用时加载，之后复用同一实例
    pub fn factory(path: Option<PathBuf>) -> ModelFactory {
        let cached: Mutex<Option<Arc<dyn PredictionModel>>> = Mutex::new(None);
        Arc::new(move || {
            let mut slot = cached
                .lock()
                .map_err(|_| MatchingError::Model("model cache poisoned".to_string()))?;
            if let Some(model) = slot.as_ref() {
                return Ok(model.clone());
            }
            let model: Arc<dyn PredictionModel> = match &path {
                Some(p) => Arc::new(DictionaryModel::from_path(p)?),
                None => {
                    tracing::warn!("No dictionary configured, using empty model");
                    Arc::new(DictionaryModel::default())
                }
            };
            *slot = Some(model.clone());
            Ok(model)
        })
    }
}

impl PredictionModel for DictionaryModel {
    fn predict(&self, text: &str) -> MatchingResult<Prediction> {
        let key = normalize(text);
        // 未收录的文本 (含空名称) 以规范化文本作为 trail，厂商未知 (0)
        Ok(self.trails.get(&key).cloned().unwrap_or(Prediction {
            trail: key,
            manufacturer_id: 0,
        }))
    }

    fn module_group(&self, trail: &str) -> Option<String> {
        self.module_groups.get(trail).cloned()
    }

    fn pharmacy_group(&self, trail: &str) -> Option<String> {
        self.pharmacy_groups.get(trail).cloned()
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DICT: &str = r#"{
        "trails": {
            "Амиодарон  0.2   г N30  таб. Иннолек": {
                "trail": "амиодарон 0.2 n30",
                "manufacturer_id": 17
            }
        },
        "module_groups": {"амиодарон 0.2 n30": "90001"},
        "pharmacy_groups": {"амиодарон 0.2 n30": "3"}
    }"#;

    #[test]
    fn known_text_uses_dictionary() {
        let model = DictionaryModel::from_json(DICT).unwrap();
        let pred = model.predict("амиодарон 0.2 г n30 таб. иннолек").unwrap();
        assert_eq!(pred.trail, "амиодарон 0.2 n30");
        assert_eq!(pred.manufacturer_id, 17);
        assert_eq!(model.module_group(&pred.trail).as_deref(), Some("90001"));
        assert_eq!(model.pharmacy_group(&pred.trail).as_deref(), Some("3"));
    }

    #[test]
    fn unknown_text_falls_back_to_normalized() {
        let model = DictionaryModel::from_json(DICT).unwrap();
        let pred = model.predict("  Розувастин 0.04 г ").unwrap();
        assert_eq!(pred.trail, "розувастин 0.04 г");
        assert_eq!(pred.manufacturer_id, 0);
        assert!(model.module_group(&pred.trail).is_none());
    }

    #[test]
    fn blank_text_gets_empty_trail() {
        let model = DictionaryModel::from_json(DICT).unwrap();
        for text in ["", "   "] {
            let pred = model.predict(text).unwrap();
            assert_eq!(pred.trail, "");
            assert_eq!(pred.manufacturer_id, 0);
            assert!(model.module_group(&pred.trail).is_none());
            assert!(model.pharmacy_group(&pred.trail).is_none());
        }
    }

    #[test]
    fn factory_loads_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict.json");
        std::fs::write(&path, DICT).unwrap();
        let factory = DictionaryModel::factory(Some(path.clone()));
        let first = factory().unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = factory().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}

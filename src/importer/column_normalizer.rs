// ==========================================
// 赛车零件追踪系统 - 表头归一化
// ==========================================
// 规则: 小写；空白 / `_` / `-` 连续段折叠为一个 `_`；去掉首尾 `_`
// 标准列: part_number, part_name, part_group, part_location,
//         miles_used, purchased_from, cost
// 其他列: 作为自定义字段键（归一化形式）
// 红线: 两列归一化到同一键 → 整个文件失败（先于任何数据行）
// ==========================================

use crate::domain::types::canonical_token;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::{BTreeMap, HashMap, HashSet};

pub const PART_NUMBER: &str = "part_number";
pub const PART_NAME: &str = "part_name";
pub const PART_GROUP: &str = "part_group";
pub const PART_LOCATION: &str = "part_location";
pub const MILES_USED: &str = "miles_used";
pub const PURCHASED_FROM: &str = "purchased_from";
pub const COST: &str = "cost";

/// 标准字段键
pub const STANDARD_FIELDS: [&str; 7] = [
    PART_NUMBER,
    PART_NAME,
    PART_GROUP,
    PART_LOCATION,
    MILES_USED,
    PURCHASED_FROM,
    COST,
];

/// 归一化后的一行: 键 → 已 trim 的单元格文本
pub type NormalizedRow = BTreeMap<String, String>;

// ==========================================
// ColumnNormalizer - 表头归一化
// ==========================================
#[derive(Debug, Clone)]
pub struct ColumnNormalizer {
    /// 与原始列一一对应；空表头列为 None（忽略）
    keys: Vec<Option<String>>,
}

impl ColumnNormalizer {
    /// 单个表头 → 规范键
    pub fn normalize_key(raw: &str) -> String {
        canonical_token(raw)
    }

    pub fn is_standard_field(key: &str) -> bool {
        STANDARD_FIELDS.contains(&key)
    }

    /// 根据表头行构建归一化器
    ///
    /// # 返回
    /// - Ok: 每列的规范键
    /// - Err(HeaderCollision): 两列映射到同一键
    pub fn from_headers(headers: &[String]) -> ImportResult<Self> {
        let mut seen: HashMap<String, &str> = HashMap::new();
        let mut keys = Vec::with_capacity(headers.len());

        for raw in headers {
            let key = Self::normalize_key(raw);
            if key.is_empty() {
                keys.push(None);
                continue;
            }
            if let Some(first) = seen.get(&key) {
                return Err(ImportError::HeaderCollision {
                    key,
                    first: first.to_string(),
                    second: raw.clone(),
                });
            }
            seen.insert(key.clone(), raw.as_str());
            keys.push(Some(key));
        }

        Ok(Self { keys })
    }

    /// 已识别的列键（按原列顺序）
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().filter_map(|k| k.as_deref())
    }

    /// 缺失的标准必填列
    pub fn missing_required(&self) -> Vec<&'static str> {
        let present: HashSet<&str> = self.keys().collect();
        [PART_NUMBER, PART_NAME, PART_GROUP, PART_LOCATION]
            .into_iter()
            .filter(|k| !present.contains(k))
            .collect()
    }

    /// 数据行 → 归一化行（多余单元格忽略，缺失单元格视为空）
    pub fn normalize_row(&self, cells: &[String]) -> NormalizedRow {
        self.keys
            .iter()
            .enumerate()
            .filter_map(|(idx, key)| {
                let key = key.as_ref()?;
                let value = cells.get(idx).map(|c| c.trim()).unwrap_or("");
                Some((key.clone(), value.to_string()))
            })
            .collect()
    }
}

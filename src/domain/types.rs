// ==========================================
// 赛车零件追踪系统 - 领域类型定义
// ==========================================
// 职责: 零件分组/位置/更换原因/字段类型/角色/风险标签
// 序列化格式: snake_case（风险标签为 SCREAMING_SNAKE_CASE）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 把分隔符（空白 / `_` / `-`）连续段折叠为单个下划线，并转小写
///
/// 供位置解析与表头归一化共用。
pub fn canonical_token(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            pending_sep = true;
            continue;
        }
        if pending_sep && !out.is_empty() {
            out.push('_');
        }
        pending_sep = false;
        out.extend(ch.to_lowercase());
    }
    out
}

// ==========================================
// 零件分组 (Part Group)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartGroup {
    Suspension,
    Drivetrain,
    Engine,
    Body,
    Electrical,
    Brakes,
    Other,
}

impl PartGroup {
    pub const ALL: [PartGroup; 7] = [
        PartGroup::Suspension,
        PartGroup::Drivetrain,
        PartGroup::Engine,
        PartGroup::Body,
        PartGroup::Electrical,
        PartGroup::Brakes,
        PartGroup::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartGroup::Suspension => "suspension",
            PartGroup::Drivetrain => "drivetrain",
            PartGroup::Engine => "engine",
            PartGroup::Body => "body",
            PartGroup::Electrical => "electrical",
            PartGroup::Brakes => "brakes",
            PartGroup::Other => "other",
        }
    }

    /// 大小写不敏感解析（前后空白忽略）
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim().to_lowercase();
        Self::ALL.into_iter().find(|g| g.as_str() == key)
    }
}

impl fmt::Display for PartGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 零件位置 (Part Location)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartLocation {
    FrontRight,
    FrontLeft,
    RearRight,
    RearLeft,
    FrontCenter,
    RearCenter,
    CenterCenter,
}

impl PartLocation {
    pub const ALL: [PartLocation; 7] = [
        PartLocation::FrontRight,
        PartLocation::FrontLeft,
        PartLocation::RearRight,
        PartLocation::RearLeft,
        PartLocation::FrontCenter,
        PartLocation::RearCenter,
        PartLocation::CenterCenter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartLocation::FrontRight => "front_right",
            PartLocation::FrontLeft => "front_left",
            PartLocation::RearRight => "rear_right",
            PartLocation::RearLeft => "rear_left",
            PartLocation::FrontCenter => "front_center",
            PartLocation::RearCenter => "rear_center",
            PartLocation::CenterCenter => "center_center",
        }
    }

    /// 大小写不敏感解析，`_` 与空格等价（"Front Right" == "front_right"）
    pub fn parse(raw: &str) -> Option<Self> {
        let key = canonical_token(raw);
        Self::ALL.into_iter().find(|l| l.as_str() == key)
    }
}

impl fmt::Display for PartLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 更换原因 (Replacement Reason)
// ==========================================
// 仅 failure 参与 MBF 统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementReason {
    Failure,
    Upgrade,
    RoutineMaintenance,
    Other,
}

impl ReplacementReason {
    pub const ALL: [ReplacementReason; 4] = [
        ReplacementReason::Failure,
        ReplacementReason::Upgrade,
        ReplacementReason::RoutineMaintenance,
        ReplacementReason::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplacementReason::Failure => "failure",
            ReplacementReason::Upgrade => "upgrade",
            ReplacementReason::RoutineMaintenance => "routine_maintenance",
            ReplacementReason::Other => "other",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let key = canonical_token(raw);
        Self::ALL.into_iter().find(|r| r.as_str() == key)
    }
}

impl fmt::Display for ReplacementReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 自定义字段类型 (Field Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Dropdown,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Dropdown => "dropdown",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "text" => Some(FieldType::Text),
            "number" => Some(FieldType::Number),
            "dropdown" => Some(FieldType::Dropdown),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 用户角色 (User Role)
// ==========================================
// admin: 读写 + 字段管理；readonly: 只读
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Readonly,
}

impl UserRole {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "readonly" => Some(UserRole::Readonly),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Readonly => write!(f, "readonly"),
        }
    }
}

// ==========================================
// 风险标签 (Risk Label)
// ==========================================
// 阈值: >=1.0 CRITICAL / >=0.8 HIGH / >=0.5 MEDIUM / >0 LOW / 其他 UNKNOWN
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLabel {
    Critical,
    High,
    Medium,
    Low,
    Unknown,
}

impl RiskLabel {
    /// 由风险分推导标签；无分数（无失效数据）为 UNKNOWN
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) if s >= 1.0 => RiskLabel::Critical,
            Some(s) if s >= 0.8 => RiskLabel::High,
            Some(s) if s >= 0.5 => RiskLabel::Medium,
            Some(s) if s > 0.0 => RiskLabel::Low,
            _ => RiskLabel::Unknown,
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLabel::Critical => write!(f, "CRITICAL"),
            RiskLabel::High => write!(f, "HIGH"),
            RiskLabel::Medium => write!(f, "MEDIUM"),
            RiskLabel::Low => write!(f, "LOW"),
            RiskLabel::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_token() {
        assert_eq!(canonical_token("  Part   Number "), "part_number");
        assert_eq!(canonical_token("__Part-_ Number__"), "part_number");
        assert_eq!(canonical_token("miles"), "miles");
        assert_eq!(canonical_token("   "), "");
    }

    #[test]
    fn test_group_parse_case_insensitive() {
        assert_eq!(PartGroup::parse("Suspension"), Some(PartGroup::Suspension));
        assert_eq!(PartGroup::parse(" BRAKES "), Some(PartGroup::Brakes));
        assert_eq!(PartGroup::parse("wheels"), None);
    }

    #[test]
    fn test_location_parse_separators() {
        assert_eq!(PartLocation::parse("Front Right"), Some(PartLocation::FrontRight));
        assert_eq!(PartLocation::parse("rear_left"), Some(PartLocation::RearLeft));
        assert_eq!(PartLocation::parse("CENTER  center"), Some(PartLocation::CenterCenter));
        assert_eq!(PartLocation::parse("middle"), None);
    }

    #[test]
    fn test_risk_label_thresholds() {
        assert_eq!(RiskLabel::from_score(Some(1.0)), RiskLabel::Critical);
        assert_eq!(RiskLabel::from_score(Some(0.8)), RiskLabel::High);
        assert_eq!(RiskLabel::from_score(Some(0.79)), RiskLabel::Medium);
        assert_eq!(RiskLabel::from_score(Some(0.5)), RiskLabel::Medium);
        assert_eq!(RiskLabel::from_score(Some(0.01)), RiskLabel::Low);
        assert_eq!(RiskLabel::from_score(Some(0.0)), RiskLabel::Unknown);
        assert_eq!(RiskLabel::from_score(None), RiskLabel::Unknown);
    }

    #[test]
    fn test_reason_roundtrip_str() {
        for reason in ReplacementReason::ALL {
            assert_eq!(ReplacementReason::parse(reason.as_str()), Some(reason));
        }
        assert_eq!(ReplacementReason::parse("crash"), None);
    }
}

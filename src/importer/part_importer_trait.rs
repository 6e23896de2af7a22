// ==========================================
// 赛车零件追踪系统 - 导入接口定义
// ==========================================
// 职责: 定义导入管道的接口（不包含实现）
// ==========================================

use crate::domain::import::ImportSummary;
use crate::domain::user::UserContext;
use crate::importer::error::ImportResult;

// ==========================================
// TabularData - 解析后的表格
// ==========================================
/// 表头 + 数据行（保留空白行，保证行号与文件一致）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 字节流 → 表格（阶段 0）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件内容
    ///
    /// # 参数
    /// - bytes: 文件原始字节
    ///
    /// # 返回
    /// - Ok(TabularData): 首行为表头，其余为数据行（单元格已 trim）
    /// - Err: 内容无法解析
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<TabularData>;
}

// ==========================================
// PartImporter Trait
// ==========================================
// 用途: 零件表格导入主接口
// 实现者: SpreadsheetImporter
pub trait PartImporter: Send + Sync {
    /// 导入一个表格文件到指定车辆
    ///
    /// # 参数
    /// - car_id: 目标车辆
    /// - filename: 原始文件名（用于判断格式）
    /// - bytes: 文件内容
    /// - user: 操作人
    ///
    /// # 返回
    /// - Ok(ImportSummary): 逐行分类结果（0 行导入也是正常结果）
    /// - Err: 整文件级错误（格式 / 表头冲突 / 基础设施）
    fn import_file(
        &self,
        car_id: &str,
        filename: &str,
        bytes: &[u8],
        user: &UserContext,
    ) -> ImportResult<ImportSummary>;
}

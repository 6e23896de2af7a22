// ==========================================
// 赛车零件追踪系统 - 文件解析器实现
// ==========================================
// 阶段 0: 上传字节流 → 表头 + 数据行
// 支持: Excel (.xlsx/.xls，首个工作表) / CSV (.csv)
// 说明: 空白行保留，由行校验归类为 blank_row
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::part_importer_trait::{FileParser, TabularData};
use calamine::{Data, Range, Reader, Xls, Xlsx};
use csv::ReaderBuilder;
use std::io::{Cursor, Read, Seek};

/// 取文件扩展名（小写）
pub fn file_extension(filename: &str) -> String {
    std::path::Path::new(filename.trim())
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<TabularData> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        // 读取表头（去掉 UTF-8 BOM）
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, h)| {
                let h = if idx == 0 { h.trim_start_matches('\u{feff}') } else { h };
                h.trim().to_string()
            })
            .collect();

        let mut rows: Vec<Vec<String>> = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|v| v.trim().to_string()).collect());
        }

        Ok(TabularData { headers, rows })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcelFlavor {
    Xlsx,
    Xls,
}

pub struct ExcelParser {
    flavor: ExcelFlavor,
}

impl ExcelParser {
    pub fn new(flavor: ExcelFlavor) -> Self {
        Self { flavor }
    }
}

/// 读取首个工作表
fn first_sheet_range<RS, R>(workbook: &mut R) -> ImportResult<Range<Data>>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

    workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::ExcelParseError(e.to_string()))
}

impl FileParser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<TabularData> {
        let cursor = Cursor::new(bytes.to_vec());

        let range = match self.flavor {
            ExcelFlavor::Xlsx => {
                let mut workbook: Xlsx<_> = Xlsx::new(cursor)
                    .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
                first_sheet_range::<Cursor<Vec<u8>>, _>(&mut workbook)?
            }
            ExcelFlavor::Xls => {
                let mut workbook: Xls<_> = Xls::new(cursor)
                    .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
                first_sheet_range::<Cursor<Vec<u8>>, _>(&mut workbook)?
            }
        };

        // 提取表头（第一行）
        let mut sheet_rows = range.rows();
        let headers: Vec<String> = match sheet_rows.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect(),
            None => return Ok(TabularData::default()),
        };

        let rows: Vec<Vec<String>> = sheet_rows
            .map(|data_row| {
                data_row
                    .iter()
                    .map(|cell| cell.to_string().trim().to_string())
                    .collect::<Vec<String>>()
            })
            .collect();

        Ok(TabularData { headers, rows })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse(&self, filename: &str, bytes: &[u8]) -> ImportResult<TabularData> {
        let ext = file_extension(filename);

        match ext.as_str() {
            "csv" => CsvParser.parse_bytes(bytes),
            "xlsx" => ExcelParser::new(ExcelFlavor::Xlsx).parse_bytes(bytes),
            "xls" => ExcelParser::new(ExcelFlavor::Xls).parse_bytes(bytes),
            _ => Err(ImportError::UnsupportedFormat(if ext.is_empty() {
                filename.to_string()
            } else {
                ext
            })),
        }
    }
}

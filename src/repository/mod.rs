// ==========================================
// 赛车零件追踪系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 连接: 共享 Arc<Mutex<Connection>>
// ==========================================

pub mod error;
pub mod field_repo;
pub mod history_repo;
pub mod mileage_repo;
pub mod part_repo;
pub mod row_codec;

pub use error::{RepositoryError, RepositoryResult};
pub use field_repo::FieldRepository;
pub use history_repo::HistoryRepository;
pub use mileage_repo::MileageRepository;
pub use part_repo::PartRepository;

// ==========================================
// 赛车零件追踪系统 - 车辆级互斥
// ==========================================
// 职责: 同一车辆的写操作（记里程 / 导入 / 更换 / 零件编辑）串行执行
// 说明: 不同车辆互不阻塞；读操作不加锁
// ==========================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("车辆锁获取失败: car_id={car_id}, {message}")]
pub struct CarLockError {
    pub car_id: String,
    pub message: String,
}

/// 车辆锁注册表
#[derive(Default)]
pub struct CarLockRegistry {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CarLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, car_id: &str) -> Result<Arc<Mutex<()>>, CarLockError> {
        let mut locks = self.locks.lock().map_err(|e| CarLockError {
            car_id: car_id.to_string(),
            message: e.to_string(),
        })?;
        Ok(locks
            .entry(car_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    /// 在车辆锁内执行闭包
    ///
    /// # 参数
    /// - car_id: 车辆ID
    /// - f: 需要互斥执行的操作
    pub fn with_car_lock<T, E, F>(&self, car_id: &str, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<CarLockError>,
    {
        let handle = self.handle(car_id)?;
        // 车辆锁不保护数据，中毒后直接恢复
        let _guard = handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        tracing::trace!(car_id = car_id, "车辆锁已获取");
        f()
    }
}

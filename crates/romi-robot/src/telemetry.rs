//! 遥测
//!
//! 每个周期以固定标签发布编码器、加速度计、陀螺仪数据。发布是尽力而为的：
//! 不返回错误、不阻塞控制周期。

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// 仪表盘字段标签
pub mod labels {
    pub const LEFT_ENCODER_COUNT: &str = "Left Encoder Count";
    pub const RIGHT_ENCODER_COUNT: &str = "Right Encoder Count";
    pub const LEFT_ENCODER_DISTANCE: &str = "Left Encoder Distance";
    pub const RIGHT_ENCODER_DISTANCE: &str = "Right Encoder Distance";
    pub const ACC_X: &str = "Acc. X";
    pub const ACC_Y: &str = "Acc. Y";
    pub const ACC_Z: &str = "Acc. Z";
    pub const GYRO_X: &str = "Gyro X";
    pub const GYRO_Y: &str = "Gyro Y";
    pub const GYRO_Z: &str = "Gyro Z";

    /// 全部标签（发布顺序）
    pub const ALL: [&str; 10] = [
        LEFT_ENCODER_COUNT,
        RIGHT_ENCODER_COUNT,
        LEFT_ENCODER_DISTANCE,
        RIGHT_ENCODER_DISTANCE,
        ACC_X,
        ACC_Y,
        ACC_Z,
        GYRO_X,
        GYRO_Y,
        GYRO_Z,
    ];
}

/// 数值仪表盘
pub trait Dashboard: Send {
    fn put_number(&mut self, key: &str, value: f64);
}

/// 丢弃所有数据的仪表盘
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDashboard;

impl Dashboard for NullDashboard {
    fn put_number(&mut self, _key: &str, _value: f64) {}
}

/// 内存仪表盘
///
/// Clone 共享同一张表（Arc），控制程序写入、外部读取。
#[derive(Debug, Default, Clone)]
pub struct SmartDashboard {
    table: Arc<Mutex<BTreeMap<String, f64>>>,
}

impl SmartDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.table.lock().get(key).copied()
    }

    /// 当前全部字段的拷贝
    pub fn snapshot(&self) -> BTreeMap<String, f64> {
        self.table.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }
}

impl Dashboard for SmartDashboard {
    fn put_number(&mut self, key: &str, value: f64) {
        let mut table = self.table.lock();
        match table.get_mut(key) {
            Some(slot) => *slot = value,
            None => {
                table.insert(key.to_string(), value);
            },
        }
    }
}

/// 单个周期的遥测采样
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetryFrame {
    pub left_count: i32,
    pub right_count: i32,
    pub left_distance: f64,
    pub right_distance: f64,
    /// 加速度 [x, y, z]（g）
    pub acceleration: [f64; 3],
    /// 陀螺仪角度 [x, y, z]（度）
    pub gyro: [f64; 3],
}

impl TelemetryFrame {
    /// 以固定标签发布
    pub fn publish(&self, dashboard: &mut dyn Dashboard) {
        dashboard.put_number(labels::LEFT_ENCODER_COUNT, f64::from(self.left_count));
        dashboard.put_number(labels::RIGHT_ENCODER_COUNT, f64::from(self.right_count));
        dashboard.put_number(labels::LEFT_ENCODER_DISTANCE, self.left_distance);
        dashboard.put_number(labels::RIGHT_ENCODER_DISTANCE, self.right_distance);

        dashboard.put_number(labels::ACC_X, self.acceleration[0]);
        dashboard.put_number(labels::ACC_Y, self.acceleration[1]);
        dashboard.put_number(labels::ACC_Z, self.acceleration[2]);

        dashboard.put_number(labels::GYRO_X, self.gyro[0]);
        dashboard.put_number(labels::GYRO_Y, self.gyro[1]);
        dashboard.put_number(labels::GYRO_Z, self.gyro[2]);
    }
}

//! # CareLink数据库模块
//!
//! 负责用户、患者、医生、就诊记录与风险分析的存储，提供PostgreSQL连接池和完整的CRUD操作。

pub mod connection;
pub mod models;
pub mod queries;

// 重新导出主要类型
pub use connection::{DatabasePool, PoolSettings};
pub use models::*;
pub use queries::{DatabaseQueries, PatientSort, SortOrder};

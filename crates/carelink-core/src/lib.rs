//! # CareLink Core
//!
//! CareLink系统的核心模块，提供基础数据结构、错误定义、存储接口和通用工具。

pub mod error;
pub mod models;
pub mod store;
pub mod utils;

pub use error::{CareError, Result};
pub use models::*;
pub use store::HealthDataStore;
pub use utils::{PageRequest, Pagination};

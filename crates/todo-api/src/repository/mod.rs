//! 数据仓储层
//!
//! 提供任务与用户的数据访问接口，封装存储细节。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 处理器只依赖 trait，存储后端在启动时选择
//! - 内存实现用于开发与测试，PostgreSQL 实现用于持久化部署
//! - trait 通过 mockall 生成 mock，便于服务层单元测试

mod memory_repo;
mod task_repo;
mod traits;
mod user_repo;

pub use memory_repo::{MemoryTaskRepository, MemoryUserRepository};
pub use task_repo::PgTaskRepository;
pub use traits::*;
pub use user_repo::PgUserRepository;

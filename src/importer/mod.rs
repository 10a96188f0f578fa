// ==========================================
// 资源分配优化器 - 输入层
// ==========================================
// 职责: 获取输入图（内存 / JSON 文件）并在导入时做结构校验
// ==========================================

pub mod error;
pub mod graph_source;
pub mod validator;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use graph_source::{load_graph_file, GraphSource, JsonGraphFile};
pub use validator::GraphValidator;

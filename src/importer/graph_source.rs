// ==========================================
// 资源分配优化器 - 输入图来源
// ==========================================
// 上游采集层的产物可以是内存中的图，也可以是 JSON 文件
// ==========================================

use crate::domain::graph::AllocationGraph;
use crate::importer::error::{ImportError, ImportResult};
use std::path::{Path, PathBuf};
use tracing::info;

/// 输入图提供方
pub trait GraphSource {
    /// 来源描述（用于日志）
    fn describe(&self) -> String;

    fn load(&self) -> ImportResult<AllocationGraph>;
}

impl GraphSource for AllocationGraph {
    fn describe(&self) -> String {
        "内存图".to_string()
    }

    fn load(&self) -> ImportResult<AllocationGraph> {
        Ok(self.clone())
    }
}

/// JSON 文件来源
#[derive(Debug, Clone, PartialEq)]
pub struct JsonGraphFile(pub PathBuf);

impl GraphSource for JsonGraphFile {
    fn describe(&self) -> String {
        self.0.display().to_string()
    }

    fn load(&self) -> ImportResult<AllocationGraph> {
        load_graph_file(&self.0)
    }
}

/// 从 JSON 文件读取输入图
pub fn load_graph_file(path: &Path) -> ImportResult<AllocationGraph> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let text = std::fs::read_to_string(path)?;
    let graph = AllocationGraph::from_json_str(&text).map_err(|e| ImportError::JsonParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    info!(
        path = %path.display(),
        resource_classes = graph.resource_classes.len(),
        activity_classes = graph.activity_classes.len(),
        "输入图已加载"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"resourceClasses":[{{"className":"Wallet","budgets":["money"],"canBeAllocatedToClasses":["Item"]}}]}}"#
        )
        .unwrap();

        let graph = JsonGraphFile(file.path().to_path_buf()).load().unwrap();
        assert_eq!(graph.resource_classes[0].class_name, "Wallet");
    }

    #[test]
    fn test_missing_file() {
        let err = load_graph_file(Path::new("/nonexistent/graph.json")).unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }

    #[test]
    fn test_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = load_graph_file(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::JsonParseError { .. }));
    }
}

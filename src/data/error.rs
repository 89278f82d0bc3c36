//! 数据集缓存相关错误类型定义

use std::path::PathBuf;
use thiserror::Error;

/// 数据集下载、校验、转换与加载过程中的错误
#[derive(Debug, Error)]
pub enum DataError {
    /// 配置文件无法读取或内容损坏
    #[error("配置文件错误 {path:?}: {reason}")]
    ConfigError { path: PathBuf, reason: String },

    /// 临时目录已存在（可能是上一次下载中断遗留的）
    #[error("目录 {0:?} 已存在，下载需要在此处创建临时目录；请手动移动或删除该目录后重试")]
    ConflictError(PathBuf),

    /// 校验和或文件大小不匹配
    #[error("校验失败 {file}: 期望 {expected}, 实际 {got}")]
    IntegrityError {
        file: String,
        expected: String,
        got: String,
    },

    /// 格式错误（如 magic number 不匹配、归档缺少数组）
    #[error("格式错误 {file}: {reason}")]
    FormatError { file: String, reason: String },

    /// 本地数据文件不存在
    #[error("数据未找到: {path:?}，请先运行 `{hint}` 下载数据")]
    NotFoundError { path: PathBuf, hint: String },

    /// IO 错误
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 下载错误
    #[error("下载错误: {0}")]
    DownloadError(String),

    /// 写入 npz 归档失败
    #[error("归档写入失败: {0}")]
    ArchiveWriteError(#[from] ndarray_npy::WriteNpzError),
}

impl DataError {
    pub(crate) fn format(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FormatError {
            file: file.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ConfigError {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

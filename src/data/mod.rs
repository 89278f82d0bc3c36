//! 数据集缓存模块
//!
//! 负责把机器学习基准数据集下载到本地统一目录，校验、解码后打包成 npz 归档，再以
//! `ndarray` 数组的形式加载回内存。
//!
//! # 主要组件
//!
//! - [`StorageConfig`]: 存储目录的解析与持久化（`~/.datasets`）
//! - [`verify`]: MD5 / 文件大小校验
//! - [`download`]: HTTP 下载、临时目录与逐文件校验
//! - [`decode`]: IDX、CIFAR 二进制格式解码
//! - [`archive`]: npz 归档的写入与读取
//! - [`datasets`]: 内置数据集描述符（CIFAR-10、MNIST、Fashion-MNIST）
//! - [`DatasetStore`]: 把以上组件串起来的下载/加载入口
//! - [`DataError`]: 错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use ml_datasets::data::{DatasetKind, DatasetStore};
//!
//! let store = DatasetStore::open()?;
//! store.download(DatasetKind::FashionMnist)?;
//! let arrays = store.load_fashion_mnist(None)?;
//! assert_eq!(arrays.x_train.shape(), &[60000, 1, 28, 28]);
//! ```

pub mod archive;
pub mod config;
pub mod datasets;
pub mod decode;
pub mod download;
pub mod error;
mod store;
pub mod verify;

#[cfg(test)]
mod tests;

// Re-exports
pub use archive::PackagedArrays;
pub use config::{FetchSettings, RestoreOutcome, StorageConfig};
pub use datasets::{DatasetDescriptor, DatasetKind, DecodeRule, descriptor, registry};
pub use decode::{DecodedRecordSet, RecordShape};
pub use download::{DownloadOutcome, HttpTransport, RemoteFileSpec, StagingDir, Transport};
pub use error::DataError;
pub use store::{DatasetStore, STAGING_DIR_NAME};
pub use verify::Expected;

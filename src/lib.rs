//! # ML Datasets
//!
//! 把常用的机器学习基准数据集（CIFAR-10、MNIST、Fashion-MNIST）保存到统一的本地目录，
//! 之后无需指定路径即可加载。
//!
//! 所有数据集都保存在 [`get_path`] 返回的目录下，默认是 `~/datasets`，可通过 [`set_path`]
//! 修改（记录在 `~/.datasets` 中）。
//!
//! 本模块的顶层函数都基于 [`DatasetStore::open`]；需要自定义配置或下载通道时直接使用
//! [`data::DatasetStore`]。

use std::path::{Path, PathBuf};

pub mod data;

pub use data::{
    DataError, DatasetKind, DatasetStore, DownloadOutcome, PackagedArrays, RestoreOutcome,
};

/// 数据集存储目录（会以 info 级别输出）
pub fn get_path() -> Result<PathBuf, DataError> {
    DatasetStore::open()?.get_path(true)
}

/// 指定数据集存储目录，`create_dir` 为 true 时自动创建该目录
pub fn set_path(new_path: impl AsRef<Path>, create_dir: bool) -> Result<PathBuf, DataError> {
    DatasetStore::open()?.set_path(new_path, create_dir)
}

/// 删除 `~/.datasets` 并恢复默认目录 `~/datasets`；必须传入 `true` 才会生效
pub fn restore_default_path(confirmed: bool) -> Result<RestoreOutcome, DataError> {
    DatasetStore::open()?.restore_default_path(confirmed)
}

/// 下载 CIFAR-10 并保存为 `cifar-10-python.npz`（MD5 校验）
pub fn download_cifar10() -> Result<DownloadOutcome, DataError> {
    DatasetStore::open()?.download_cifar10()
}

/// 下载 MNIST 并保存为 `mnist.npz`（文件大小校验）
pub fn download_mnist() -> Result<DownloadOutcome, DataError> {
    DatasetStore::open()?.download_mnist()
}

/// 下载 Fashion-MNIST 并保存为 `fashion_mnist.npz`（MD5 校验）
pub fn download_fashion_mnist() -> Result<DownloadOutcome, DataError> {
    DatasetStore::open()?.download_fashion_mnist()
}

/// 加载 CIFAR-10；`filename` 为 None 时使用 `cifar-10-python.npz`
pub fn load_cifar10(filename: Option<&str>) -> Result<PackagedArrays, DataError> {
    DatasetStore::open()?.load_cifar10(filename)
}

/// 加载 MNIST；`filename` 为 None 时使用 `mnist.npz`
pub fn load_mnist(filename: Option<&str>) -> Result<PackagedArrays, DataError> {
    DatasetStore::open()?.load_mnist(filename)
}

/// 加载 Fashion-MNIST；`filename` 为 None 时使用 `fashion_mnist.npz`
pub fn load_fashion_mnist(filename: Option<&str>) -> Result<PackagedArrays, DataError> {
    DatasetStore::open()?.load_fashion_mnist(filename)
}

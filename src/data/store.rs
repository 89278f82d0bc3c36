//! 数据集本地缓存：下载 → 校验 → 解码 → 打包，以及从缓存加载
//!
//! # 使用示例
//!
//! ```ignore
//! use ml_datasets::data::{DatasetKind, DatasetStore, DownloadOutcome};
//!
//! let store = DatasetStore::open()?;
//! match store.download(DatasetKind::Mnist)? {
//!     DownloadOutcome::Downloaded(path) => println!("已保存到 {path:?}"),
//!     DownloadOutcome::AlreadyExists(path) => println!("已存在: {path:?}"),
//! }
//! let (x_train, y_train, x_test, y_test) = store.load_mnist(None)?.into_tuple();
//! let class_name = DatasetKind::Mnist.labels()[y_train[0] as usize];
//! ```

use std::path::{Path, PathBuf};

use log::info;

use super::archive::{self, PackagedArrays};
use super::config::{FetchSettings, RestoreOutcome, StorageConfig};
use super::datasets::{DatasetDescriptor, DatasetKind, descriptor};
use super::download::{DownloadOutcome, HttpTransport, StagingDir, Transport, fetch};
use super::error::DataError;

/// 下载时在存储目录下创建的临时目录名
pub const STAGING_DIR_NAME: &str = "_tmp_dir_";

/// 数据集存储
///
/// 组合了存储目录配置与下载通道。
#[derive(Debug, Clone)]
pub struct DatasetStore<T: Transport = HttpTransport> {
    config: StorageConfig,
    transport: T,
}

impl DatasetStore<HttpTransport> {
    /// 使用环境/主目录中的配置与默认的 HTTP 下载通道
    pub fn open() -> Result<Self, DataError> {
        let config = StorageConfig::from_env()?;
        let settings = FetchSettings::from_env()?;
        Ok(Self::with_transport(config, HttpTransport::new(settings.timeout)))
    }
}

impl<T: Transport> DatasetStore<T> {
    pub fn with_transport(config: StorageConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 当前存储目录
    pub fn get_path(&self, verbose: bool) -> Result<PathBuf, DataError> {
        self.config.get_path(verbose)
    }

    pub fn set_path(&self, new_path: impl AsRef<Path>, create_dir: bool) -> Result<PathBuf, DataError> {
        self.config.set_path(new_path, create_dir)
    }

    pub fn restore_default_path(&self, confirmed: bool) -> Result<RestoreOutcome, DataError> {
        self.config.restore_default(confirmed)
    }

    /// 下载内置数据集并保存为 npz 归档
    pub fn download(&self, kind: DatasetKind) -> Result<DownloadOutcome, DataError> {
        self.download_descriptor(descriptor(kind))
    }

    /// 按描述符下载数据集
    ///
    /// 目标文件已存在时直接返回 [`DownloadOutcome::AlreadyExists`]，不访问网络；
    /// 目标位置是目录时返回 [`DataError::ConflictError`]。
    pub fn download_descriptor(&self, descriptor: &DatasetDescriptor) -> Result<DownloadOutcome, DataError> {
        let dir = self.config.get_path(false)?;
        let destination = dir.join(descriptor.default_filename);

        if destination.is_dir() {
            return Err(DataError::ConflictError(destination));
        }
        if destination.is_file() {
            info!("文件已存在: {}", destination.display());
            return Ok(DownloadOutcome::AlreadyExists(destination));
        }

        let staging = StagingDir::acquire(dir.join(STAGING_DIR_NAME))?;
        let files = fetch(&self.transport, &staging, &descriptor.remote_files)?;
        let (train, test) = descriptor.decode(&files)?;
        info!(
            "{} 解码完成: 训练集 {} 条，测试集 {} 条",
            descriptor.name(),
            train.len(),
            test.len()
        );
        archive::build(&train, &test, &destination)
    }

    /// 从存储目录加载数据集
    ///
    /// # 参数
    /// - `kind`: 数据集
    /// - `filename`: 归档文件名，None 则使用该数据集的默认文件名
    pub fn load(&self, kind: DatasetKind, filename: Option<&str>) -> Result<PackagedArrays, DataError> {
        let descriptor = descriptor(kind);
        let path = self
            .config
            .get_path(false)?
            .join(filename.unwrap_or(descriptor.default_filename));
        if !path.is_file() {
            return Err(DataError::NotFoundError {
                path,
                hint: format!("datasets download {}", kind.name()),
            });
        }
        let arrays = archive::read(&path)?;
        info!("{kind} loaded");
        Ok(arrays)
    }

    pub fn download_cifar10(&self) -> Result<DownloadOutcome, DataError> {
        self.download(DatasetKind::Cifar10)
    }

    pub fn download_mnist(&self) -> Result<DownloadOutcome, DataError> {
        self.download(DatasetKind::Mnist)
    }

    pub fn download_fashion_mnist(&self) -> Result<DownloadOutcome, DataError> {
        self.download(DatasetKind::FashionMnist)
    }

    /// CIFAR-10：[N, 3, 32, 32]，训练 50,000 条、测试 10,000 条，标签见 [`DatasetKind::labels`]
    pub fn load_cifar10(&self, filename: Option<&str>) -> Result<PackagedArrays, DataError> {
        self.load(DatasetKind::Cifar10, filename)
    }

    /// MNIST：[N, 1, 28, 28]，训练 60,000 条、测试 10,000 条
    pub fn load_mnist(&self, filename: Option<&str>) -> Result<PackagedArrays, DataError> {
        self.load(DatasetKind::Mnist, filename)
    }

    /// Fashion-MNIST：[N, 1, 28, 28]，训练 60,000 条、测试 10,000 条
    pub fn load_fashion_mnist(&self, filename: Option<&str>) -> Result<PackagedArrays, DataError> {
        self.load(DatasetKind::FashionMnist, filename)
    }
}

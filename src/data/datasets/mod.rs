//! 内置数据集
//!
//! 每个数据集由一个 [`DatasetDescriptor`] 描述：名称、默认归档文件名、远程文件与校验值、
//! 记录形状、类别名称以及解码规则。描述符通过 [`registry`] / [`descriptor`] 查找。
//!
//! - CIFAR-10：32x32 彩色图像，10 类
//! - MNIST：28x28 手写数字，10 类
//! - Fashion-MNIST：28x28 服饰图像，10 类

mod cifar10;
mod mnist;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::decode::{DecodedRecordSet, RecordShape};
use super::download::{FetchedFiles, RemoteFileSpec};
use super::error::DataError;

pub use cifar10::CIFAR10_LABELS;
pub use mnist::{FASHION_MNIST_LABELS, MNIST_LABELS};

/// 支持的数据集
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Cifar10,
    Mnist,
    FashionMnist,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 3] = [
        DatasetKind::Cifar10,
        DatasetKind::Mnist,
        DatasetKind::FashionMnist,
    ];

    /// 数据集名称，也是 CLI 中使用的名字
    pub fn name(self) -> &'static str {
        match self {
            DatasetKind::Cifar10 => "cifar10",
            DatasetKind::Mnist => "mnist",
            DatasetKind::FashionMnist => "fashion_mnist",
        }
    }

    /// 类别名称，按标签值索引
    pub fn labels(self) -> &'static [&'static str] {
        descriptor(self).label_map
    }

    fn index(self) -> usize {
        match self {
            DatasetKind::Cifar10 => 0,
            DatasetKind::Mnist => 1,
            DatasetKind::FashionMnist => 2,
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "cifar10" | "cifar_10" => Ok(DatasetKind::Cifar10),
            "mnist" => Ok(DatasetKind::Mnist),
            "fashion_mnist" | "fashionmnist" => Ok(DatasetKind::FashionMnist),
            _ => Err(format!(
                "未知的数据集 `{s}`，可选: cifar10, mnist, fashion_mnist"
            )),
        }
    }
}

/// 由下载文件得到训练、测试划分的规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum DecodeRule {
    /// 四个（gzip 压缩的）IDX 文件
    Idx {
        train_images: &'static str,
        train_labels: &'static str,
        test_images: &'static str,
        test_labels: &'static str,
    },
    /// 一个 tar.gz 包，内含若干 CIFAR 二进制 batch
    CifarBinary {
        archive: &'static str,
        train_batches: &'static [&'static str],
        test_batch: &'static str,
    },
}

/// 数据集描述符
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetDescriptor {
    pub kind: DatasetKind,
    /// 默认的归档文件名（位于存储目录下）
    pub default_filename: &'static str,
    pub remote_files: Vec<RemoteFileSpec>,
    pub record_shape: RecordShape,
    pub num_classes: usize,
    pub label_map: &'static [&'static str],
    pub decode_rule: DecodeRule,
}

impl DatasetDescriptor {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// 把已下载的文件解码为 (训练集, 测试集)
    pub fn decode(&self, files: &FetchedFiles) -> Result<(DecodedRecordSet, DecodedRecordSet), DataError> {
        match &self.decode_rule {
            DecodeRule::Idx {
                train_images,
                train_labels,
                test_images,
                test_labels,
            } => {
                let train = mnist::decode_split(self, files, train_images, train_labels)?;
                let test = mnist::decode_split(self, files, test_images, test_labels)?;
                Ok((train, test))
            }
            DecodeRule::CifarBinary {
                archive,
                train_batches,
                test_batch,
            } => cifar10::decode_archive(self, files, archive, train_batches, test_batch),
        }
    }
}

/// 所有内置数据集，顺序与 [`DatasetKind::ALL`] 一致
pub fn registry() -> &'static [DatasetDescriptor] {
    static REGISTRY: OnceLock<Vec<DatasetDescriptor>> = OnceLock::new();
    REGISTRY.get_or_init(|| vec![cifar10::descriptor(), mnist::mnist(), mnist::fashion_mnist()])
}

/// 按类型查找数据集描述符
pub fn descriptor(kind: DatasetKind) -> &'static DatasetDescriptor {
    &registry()[kind.index()]
}

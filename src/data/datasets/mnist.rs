//! MNIST 与 Fashion-MNIST
//!
//! 两者格式相同：训练集 60,000、测试集 10,000 张 28x28 灰度图，标签 0-9，
//! 各由四个 gzip 压缩的 IDX 文件组成。

use super::{DatasetDescriptor, DatasetKind, DecodeRule};
use crate::data::decode::{DecodedRecordSet, RecordShape, gunzip};
use crate::data::download::{FetchedFiles, RemoteFileSpec};
use crate::data::error::DataError;
use crate::data::verify::Expected;

/// MNIST 下载地址（使用 AWS S3 镜像，原官网 yann.lecun.com 不稳定）
const MNIST_BASE_URL: &str = "https://ossci-datasets.s3.amazonaws.com/mnist/";

/// Fashion-MNIST 下载地址
const FASHION_MNIST_BASE_URL: &str = "http://fashion-mnist.s3-website.eu-central-1.amazonaws.com/";

const TRAIN_IMAGES: &str = "train-images-idx3-ubyte.gz";
const TRAIN_LABELS: &str = "train-labels-idx1-ubyte.gz";
const TEST_IMAGES: &str = "t10k-images-idx3-ubyte.gz";
const TEST_LABELS: &str = "t10k-labels-idx1-ubyte.gz";

/// MNIST 文件按字节数校验
const MNIST_FILES: [(&str, u64); 4] = [
    (TRAIN_IMAGES, 9_912_422),
    (TRAIN_LABELS, 28_881),
    (TEST_IMAGES, 1_648_877),
    (TEST_LABELS, 4_542),
];

/// Fashion-MNIST 文件按 MD5 校验
const FASHION_MNIST_FILES: [(&str, &str); 4] = [
    (TRAIN_IMAGES, "8d4fb7e6c68d591d4c3dfef9ec88bf0d"),
    (TRAIN_LABELS, "25c81989df183df01b3e8a0aad5dffbe"),
    (TEST_IMAGES, "bef4ecab320f06d8554ea6380940ec79"),
    (TEST_LABELS, "bb300cfdad3c16e7a12a480ee83cd310"),
];

pub const MNIST_LABELS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

pub const FASHION_MNIST_LABELS: [&str; 10] = [
    "T-shirt/top",
    "Trouser",
    "Pullover",
    "Dress",
    "Coat",
    "Sandal",
    "Shirt",
    "Sneaker",
    "Bag",
    "Ankle boot",
];

const IDX_RULE: DecodeRule = DecodeRule::Idx {
    train_images: TRAIN_IMAGES,
    train_labels: TRAIN_LABELS,
    test_images: TEST_IMAGES,
    test_labels: TEST_LABELS,
};

const RECORD_SHAPE: RecordShape = RecordShape::new(1, 28, 28);

pub(super) fn mnist() -> DatasetDescriptor {
    DatasetDescriptor {
        kind: DatasetKind::Mnist,
        default_filename: "mnist.npz",
        remote_files: MNIST_FILES
            .iter()
            .map(|&(name, size)| {
                RemoteFileSpec::new(name, format!("{MNIST_BASE_URL}{name}"), Expected::Size(size))
            })
            .collect(),
        record_shape: RECORD_SHAPE,
        num_classes: 10,
        label_map: &MNIST_LABELS,
        decode_rule: IDX_RULE,
    }
}

pub(super) fn fashion_mnist() -> DatasetDescriptor {
    DatasetDescriptor {
        kind: DatasetKind::FashionMnist,
        default_filename: "fashion_mnist.npz",
        remote_files: FASHION_MNIST_FILES
            .iter()
            .map(|&(name, md5)| {
                RemoteFileSpec::new(
                    name,
                    format!("{FASHION_MNIST_BASE_URL}{name}"),
                    Expected::Md5(md5.to_string()),
                )
            })
            .collect(),
        record_shape: RECORD_SHAPE,
        num_classes: 10,
        label_map: &FASHION_MNIST_LABELS,
        decode_rule: IDX_RULE,
    }
}

/// 解压并解码一对 IDX 图像、标签文件
pub(super) fn decode_split(
    descriptor: &DatasetDescriptor,
    files: &FetchedFiles,
    images: &str,
    labels: &str,
) -> Result<DecodedRecordSet, DataError> {
    let image_bytes = gunzip(images, &files.read(images)?)?;
    let label_bytes = gunzip(labels, &files.read(labels)?)?;
    DecodedRecordSet::from_idx(
        (images, &image_bytes[..]),
        (labels, &label_bytes[..]),
        descriptor.record_shape,
        descriptor.num_classes,
    )
}

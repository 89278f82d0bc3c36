//! CIFAR-10
//!
//! 60,000 张 3x32x32 彩色图像，10 类，每类 6,000 张；其中 50,000 张训练、10,000 张测试。
//! 下载的是二进制版本 `cifar-10-binary.tar.gz`，内含 5 个训练 batch 和 1 个测试 batch。
//!
//! <https://www.cs.toronto.edu/~kriz/cifar.html>

use super::{DatasetDescriptor, DatasetKind, DecodeRule};
use crate::data::decode::{DecodedRecordSet, RecordShape, decode_cifar_batch, untar};
use crate::data::download::{FetchedFiles, RemoteFileSpec};
use crate::data::error::DataError;
use crate::data::verify::Expected;

const CIFAR10_URL: &str = "https://www.cs.toronto.edu/~kriz/cifar-10-binary.tar.gz";
const CIFAR10_ARCHIVE: &str = "cifar-10-binary.tar.gz";
const CIFAR10_MD5: &str = "c32a1d4ab5d03f1284b67883e8d87530";

const TRAIN_BATCHES: [&str; 5] = [
    "data_batch_1.bin",
    "data_batch_2.bin",
    "data_batch_3.bin",
    "data_batch_4.bin",
    "data_batch_5.bin",
];
const TEST_BATCH: &str = "test_batch.bin";

pub const CIFAR10_LABELS: [&str; 10] = [
    "airplane",
    "automobile",
    "bird",
    "cat",
    "deer",
    "dog",
    "frog",
    "horse",
    "ship",
    "truck",
];

pub(super) fn descriptor() -> DatasetDescriptor {
    DatasetDescriptor {
        kind: DatasetKind::Cifar10,
        default_filename: "cifar-10-python.npz",
        remote_files: vec![RemoteFileSpec::new(
            CIFAR10_ARCHIVE,
            CIFAR10_URL,
            Expected::Md5(CIFAR10_MD5.to_string()),
        )],
        record_shape: RecordShape::new(3, 32, 32),
        num_classes: 10,
        label_map: &CIFAR10_LABELS,
        decode_rule: DecodeRule::CifarBinary {
            archive: CIFAR10_ARCHIVE,
            train_batches: &TRAIN_BATCHES,
            test_batch: TEST_BATCH,
        },
    }
}

/// 解包 tar.gz 并解码训练、测试 batch
pub(super) fn decode_archive(
    descriptor: &DatasetDescriptor,
    files: &FetchedFiles,
    archive: &str,
    train_batches: &[&str],
    test_batch: &str,
) -> Result<(DecodedRecordSet, DecodedRecordSet), DataError> {
    let entries = untar(archive, &files.read(archive)?)?;
    let batch = |name: &str| -> Result<DecodedRecordSet, DataError> {
        let raw = entries
            .get(name)
            .ok_or_else(|| DataError::format(archive, format!("压缩包中缺少 {name}")))?;
        decode_cifar_batch(name, raw, descriptor.record_shape, descriptor.num_classes)
    };

    let train_parts = train_batches
        .iter()
        .map(|&name| batch(name))
        .collect::<Result<Vec<_>, _>>()?;
    let train = DecodedRecordSet::concat(&train_parts)?;
    let test = batch(test_batch)?;
    Ok((train, test))
}

//! 打包归档（npz）的写入与读取
//!
//! 一个归档恰好包含四个 u8 数组：`x_train` [N,C,H,W]、`y_train` [N]、`x_test`、`y_test`。
//! 数组在 zip 中以 `<key>.npy` 命名，与 numpy 的 `savez_compressed` 保持一致。

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;
use ndarray::{Array1, Array4, Axis, Ix1, Ix4, OwnedRepr};
use ndarray_npy::{NpzReader, NpzWriter};
use tempfile::NamedTempFile;

use super::decode::DecodedRecordSet;
use super::download::DownloadOutcome;
use super::error::DataError;

/// 归档中的四个数组键（按返回顺序）
pub const ARRAY_KEYS: [&str; 4] = ["x_train", "y_train", "x_test", "y_test"];

/// 从归档加载得到的四个数组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedArrays {
    pub x_train: Array4<u8>,
    pub y_train: Array1<u8>,
    pub x_test: Array4<u8>,
    pub y_test: Array1<u8>,
}

impl PackagedArrays {
    /// 训练集样本数
    pub fn train_len(&self) -> usize {
        self.y_train.len()
    }

    /// 测试集样本数
    pub fn test_len(&self) -> usize {
        self.y_test.len()
    }

    /// 拆成 (训练数据, 训练标签, 测试数据, 测试标签)
    pub fn into_tuple(self) -> (Array4<u8>, Array1<u8>, Array4<u8>, Array1<u8>) {
        (self.x_train, self.y_train, self.x_test, self.y_test)
    }
}

fn entry_name(key: &str) -> String {
    format!("{key}.npy")
}

/// 把训练、测试划分写成一个 npz 归档
///
/// 目标文件已存在时不覆盖，返回 [`DownloadOutcome::AlreadyExists`]。
/// 数据先写入同目录下的临时文件，完成后再原子地移动到目标位置，读者不会看到写了一半的归档。
pub fn build(
    train: &DecodedRecordSet,
    test: &DecodedRecordSet,
    destination: &Path,
) -> Result<DownloadOutcome, DataError> {
    if destination.exists() {
        info!("文件已存在: {}", destination.display());
        return Ok(DownloadOutcome::AlreadyExists(destination.to_path_buf()));
    }

    let dir = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut npz = NpzWriter::new_compressed(tmp.as_file());
        npz.add_array(entry_name("x_train"), train.data())?;
        npz.add_array(entry_name("y_train"), train.labels())?;
        npz.add_array(entry_name("x_test"), test.data())?;
        npz.add_array(entry_name("y_test"), test.labels())?;
        npz.finish()?;
    }
    tmp.as_file().sync_all()?;

    match tmp.persist_noclobber(destination) {
        Ok(_) => {
            info!("已写入 {}", destination.display());
            Ok(DownloadOutcome::Downloaded(destination.to_path_buf()))
        }
        Err(_) if destination.exists() => {
            info!("文件已存在: {}", destination.display());
            Ok(DownloadOutcome::AlreadyExists(destination.to_path_buf()))
        }
        Err(e) => Err(e.error.into()),
    }
}

/// 读取 npz 归档中的四个数组
///
/// 缺少任一键、元素类型或维数不符、同一划分中图像数与标签数不一致时返回
/// [`DataError::FormatError`]。
pub fn read(path: &Path) -> Result<PackagedArrays, DataError> {
    let file_name = path.display().to_string();
    let bad = |reason: String| DataError::format(file_name.clone(), reason);

    let mut npz = NpzReader::new(BufReader::new(File::open(path)?))
        .map_err(|e| bad(format!("无法打开 npz: {e}")))?;
    let names = npz
        .names()
        .map_err(|e| bad(format!("无法读取数组列表: {e}")))?;
    for key in ARRAY_KEYS {
        let entry = entry_name(key);
        if !names.iter().any(|n| n == &entry || n == key) {
            return Err(bad(format!("缺少数组 `{key}`")));
        }
    }
    // numpy 写出的归档带 .npy 后缀，兼容不带后缀的写法
    let resolve = |key: &str| {
        let entry = entry_name(key);
        if names.contains(&entry) { entry } else { key.to_string() }
    };

    let x_train = npz
        .by_name::<OwnedRepr<u8>, Ix4>(&resolve("x_train"))
        .map_err(|e| bad(format!("读取 x_train 失败: {e}")))?;
    let y_train = npz
        .by_name::<OwnedRepr<u8>, Ix1>(&resolve("y_train"))
        .map_err(|e| bad(format!("读取 y_train 失败: {e}")))?;
    let x_test = npz
        .by_name::<OwnedRepr<u8>, Ix4>(&resolve("x_test"))
        .map_err(|e| bad(format!("读取 x_test 失败: {e}")))?;
    let y_test = npz
        .by_name::<OwnedRepr<u8>, Ix1>(&resolve("y_test"))
        .map_err(|e| bad(format!("读取 y_test 失败: {e}")))?;

    for (split, x, y) in [("train", &x_train, &y_train), ("test", &x_test, &y_test)] {
        if x.len_of(Axis(0)) != y.len() {
            return Err(bad(format!(
                "{split} 划分中图像数 {} 与标签数 {} 不一致",
                x.len_of(Axis(0)),
                y.len()
            )));
        }
    }

    Ok(PackagedArrays {
        x_train,
        y_train,
        x_test,
        y_test,
    })
}

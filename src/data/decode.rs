//! 厂商二进制格式解码
//!
//! 支持：
//! - IDX 图像/标签文件（MNIST、Fashion-MNIST）
//! - CIFAR-10 二进制 batch 文件
//! - gzip 解压与 tar 包的内存解包
//!
//! 这里的函数都是纯函数：输入字节，输出数组，不访问网络和文件系统。

use std::collections::BTreeMap;
use std::io::Read;

use flate2::read::GzDecoder;
use ndarray::{Array1, Array4, Axis, concatenate};
use serde::{Deserialize, Serialize};
use tar::Archive;

use super::error::DataError;

/// IDX 格式中 unsigned byte 的类型码
const IDX_UBYTE: u8 = 0x08;
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// 单条记录（一张图像）的形状 [C, H, W]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordShape {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
}

impl RecordShape {
    pub const fn new(channels: usize, height: usize, width: usize) -> Self {
        Self {
            channels,
            height,
            width,
        }
    }

    /// 单条记录的字节数
    pub const fn volume(&self) -> usize {
        self.channels * self.height * self.width
    }
}

/// 解码后的一个数据划分（训练集或测试集）
///
/// 图像 [N, C, H, W]，标签 [N]；两者的 N 一定相等。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecordSet {
    data: Array4<u8>,
    labels: Array1<u8>,
}

impl DecodedRecordSet {
    pub fn new(data: Array4<u8>, labels: Array1<u8>) -> Result<Self, DataError> {
        let n = data.len_of(Axis(0));
        if n != labels.len() {
            return Err(DataError::format(
                "record set",
                format!("图像数 {n} 与标签数 {} 不一致", labels.len()),
            ));
        }
        Ok(Self { data, labels })
    }

    /// 由一对 IDX 图像、标签文件解码
    pub fn from_idx(
        images: (&str, &[u8]),
        labels: (&str, &[u8]),
        shape: RecordShape,
        num_classes: usize,
    ) -> Result<Self, DataError> {
        let data = decode_idx_images(images.0, images.1, shape)?;
        let labels_arr = decode_idx_labels(labels.0, labels.1, num_classes)?;
        Self::new(data, labels_arr).map_err(|_| {
            DataError::format(
                labels.0,
                format!("标签数与 {} 中的图像数不一致", images.0),
            )
        })
    }

    /// 沿样本维拼接多个划分（如 CIFAR-10 的 5 个训练 batch）
    pub fn concat(parts: &[DecodedRecordSet]) -> Result<Self, DataError> {
        let data_views: Vec<_> = parts.iter().map(|p| p.data.view()).collect();
        let label_views: Vec<_> = parts.iter().map(|p| p.labels.view()).collect();
        let data = concatenate(Axis(0), &data_views)
            .map_err(|e| DataError::format("record set", format!("拼接图像失败: {e}")))?;
        let labels = concatenate(Axis(0), &label_views)
            .map_err(|e| DataError::format("record set", format!("拼接标签失败: {e}")))?;
        Self::new(data, labels)
    }

    pub fn data(&self) -> &Array4<u8> {
        &self.data
    }

    pub fn labels(&self) -> &Array1<u8> {
        &self.labels
    }

    /// 样本数量
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn into_parts(self) -> (Array4<u8>, Array1<u8>) {
        (self.data, self.labels)
    }
}

/// 检查 IDX magic number：前两字节为 0，第三字节为类型码，第四字节为维数
fn check_idx_magic(file: &str, raw: &[u8], ndims: u8) -> Result<(), DataError> {
    if raw.len() < 4 {
        return Err(DataError::format(file, "文件过短，缺少 magic number"));
    }
    let magic = [raw[0], raw[1], raw[2], raw[3]];
    if magic != [0, 0, IDX_UBYTE, ndims] {
        return Err(DataError::format(
            file,
            format!(
                "无效的 magic number: {:?} (期望 {:?})",
                magic,
                [0, 0, IDX_UBYTE, ndims]
            ),
        ));
    }
    Ok(())
}

/// 读取头部中第 `index` 个大端 u32 维度（紧跟在 magic number 之后）
fn idx_dim(raw: &[u8], index: usize) -> usize {
    let at = 4 + index * 4;
    u32::from_be_bytes([raw[at], raw[at + 1], raw[at + 2], raw[at + 3]]) as usize
}

/// 解析 IDX 图像文件
///
/// IDX 格式：
/// - [0-3] magic number (0x00000803)
/// - [4-7] number of images
/// - [8-11] number of rows
/// - [12-15] number of columns
/// - [16+] pixel data (unsigned byte)
///
/// 返回形状为 [N, C, H, W] 的数组，C 取自 `shape`。
pub fn decode_idx_images(file: &str, raw: &[u8], shape: RecordShape) -> Result<Array4<u8>, DataError> {
    const HEADER_LEN: usize = 16;
    check_idx_magic(file, raw, 3)?;
    if raw.len() < HEADER_LEN {
        return Err(DataError::format(file, "读取头部失败: 文件过短"));
    }

    let num_images = idx_dim(raw, 0);
    let num_rows = idx_dim(raw, 1);
    let num_cols = idx_dim(raw, 2);
    if num_rows != shape.height || num_cols != shape.width {
        return Err(DataError::format(
            file,
            format!(
                "无效的图像尺寸: {num_rows}x{num_cols} (期望 {}x{})",
                shape.height, shape.width
            ),
        ));
    }

    let body = &raw[HEADER_LEN..];
    let expected = num_images * shape.volume();
    if body.len() != expected {
        return Err(DataError::format(
            file,
            format!("像素数据长度 {} 与头部声明的 {expected} 不一致", body.len()),
        ));
    }

    Array4::from_shape_vec(
        (num_images, shape.channels, shape.height, shape.width),
        body.to_vec(),
    )
    .map_err(|e| DataError::format(file, e.to_string()))
}

/// 解析 IDX 标签文件
///
/// IDX 格式：
/// - [0-3] magic number (0x00000801)
/// - [4-7] number of labels
/// - [8+] label data (unsigned byte, 0..num_classes)
pub fn decode_idx_labels(file: &str, raw: &[u8], num_classes: usize) -> Result<Array1<u8>, DataError> {
    const HEADER_LEN: usize = 8;
    check_idx_magic(file, raw, 1)?;
    if raw.len() < HEADER_LEN {
        return Err(DataError::format(file, "读取头部失败: 文件过短"));
    }

    let num_labels = idx_dim(raw, 0);
    let body = &raw[HEADER_LEN..];
    if body.len() != num_labels {
        return Err(DataError::format(
            file,
            format!("标签数据长度 {} 与头部声明的 {num_labels} 不一致", body.len()),
        ));
    }
    check_label_range(file, body, num_classes)?;

    Ok(Array1::from(body.to_vec()))
}

/// 解析 CIFAR-10 二进制 batch 文件
///
/// 每条记录 `1 + C*H*W` 字节：第一个字节是标签，其后依次是 R、G、B 三个通道的行优先像素。
pub fn decode_cifar_batch(
    file: &str,
    raw: &[u8],
    shape: RecordShape,
    num_classes: usize,
) -> Result<DecodedRecordSet, DataError> {
    let record_len = 1 + shape.volume();
    if raw.is_empty() || raw.len() % record_len != 0 {
        return Err(DataError::format(
            file,
            format!("文件长度 {} 不是记录长度 {record_len} 的整数倍", raw.len()),
        ));
    }

    let n = raw.len() / record_len;
    let mut labels = Vec::with_capacity(n);
    let mut pixels = Vec::with_capacity(n * shape.volume());
    for record in raw.chunks_exact(record_len) {
        labels.push(record[0]);
        pixels.extend_from_slice(&record[1..]);
    }
    check_label_range(file, &labels, num_classes)?;

    let data = Array4::from_shape_vec((n, shape.channels, shape.height, shape.width), pixels)
        .map_err(|e| DataError::format(file, e.to_string()))?;
    DecodedRecordSet::new(data, Array1::from(labels))
}

fn check_label_range(file: &str, labels: &[u8], num_classes: usize) -> Result<(), DataError> {
    match labels.iter().position(|&l| l as usize >= num_classes) {
        Some(i) => Err(DataError::format(
            file,
            format!("第 {i} 个标签 {} 超出范围 [0, {num_classes})", labels[i]),
        )),
        None => Ok(()),
    }
}

/// gzip 数据解压；不是 gzip 格式时原样返回
pub fn gunzip(file: &str, raw: &[u8]) -> Result<Vec<u8>, DataError> {
    if !raw.starts_with(&GZIP_MAGIC) {
        return Ok(raw.to_vec());
    }
    let mut out = Vec::new();
    GzDecoder::new(raw)
        .read_to_end(&mut out)
        .map_err(|e| DataError::format(file, format!("解压失败: {e}")))?;
    Ok(out)
}

/// 在内存中解包 tar（可为 gzip 压缩），返回 文件名 → 内容
///
/// 键只取条目路径的最后一段文件名，目录条目被忽略。
pub fn untar(file: &str, raw: &[u8]) -> Result<BTreeMap<String, Vec<u8>>, DataError> {
    let tarball = gunzip(file, raw)?;
    let mut archive = Archive::new(tarball.as_slice());
    let mut out = BTreeMap::new();

    let entries = archive
        .entries()
        .map_err(|e| DataError::format(file, format!("读取 tar 条目失败: {e}")))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| DataError::format(file, format!("读取 tar 条目失败: {e}")))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = entry
            .path()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .ok_or_else(|| DataError::format(file, "无效的 tar 条目路径"))?;
        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .map_err(|e| DataError::format(file, format!("解包 {name} 失败: {e}")))?;
        out.insert(name, content);
    }
    Ok(out)
}

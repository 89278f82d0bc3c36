//! 下载文件的完整性校验
//!
//! 每个远程文件要么给出 MD5 校验码，要么给出精确的字节数。

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use super::error::DataError;

const CHUNK_SIZE: usize = 8192;

/// 期望的校验值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expected {
    /// 小写十六进制的 MD5 摘要
    Md5(String),
    /// 精确的文件字节数
    Size(u64),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Md5(digest) => write!(f, "md5 {digest}"),
            Expected::Size(bytes) => write!(f, "{bytes} 字节"),
        }
    }
}

/// 计算数据的 MD5 校验码
pub fn compute_md5(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// 分块读取文件并计算 MD5，不会把整个文件读入内存
pub fn compute_file_md5(path: &Path) -> Result<String, DataError> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Md5::new();
    let mut buffer = [0u8; CHUNK_SIZE];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// 计算文件对应 `expected` 类型的实际值
fn actual_for(path: &Path, expected: &Expected) -> Result<Expected, DataError> {
    Ok(match expected {
        Expected::Md5(_) => Expected::Md5(compute_file_md5(path)?),
        Expected::Size(_) => Expected::Size(fs::metadata(path)?.len()),
    })
}

fn matches(actual: &Expected, expected: &Expected) -> bool {
    match (actual, expected) {
        (Expected::Md5(got), Expected::Md5(want)) => got.eq_ignore_ascii_case(want),
        (got, want) => got == want,
    }
}

/// 校验文件是否与期望值一致
pub fn verify(path: &Path, expected: &Expected) -> Result<bool, DataError> {
    Ok(matches(&actual_for(path, expected)?, expected))
}

/// 校验文件，不一致时返回 [`DataError::IntegrityError`]
pub fn ensure_verified(path: &Path, expected: &Expected) -> Result<(), DataError> {
    let actual = actual_for(path, expected)?;
    if !matches(&actual, expected) {
        return Err(DataError::IntegrityError {
            file: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            expected: expected.to_string(),
            got: actual.to_string(),
        });
    }
    debug!("校验通过: {} ({actual})", path.display());
    Ok(())
}

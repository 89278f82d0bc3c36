//! 远程文件下载
//!
//! 提供 HTTP 下载、临时目录管理与逐文件校验，供各数据集复用。
//!
//! 一次下载的所有文件先写入存储目录下的临时目录（见 [`StagingDir`]），全部校验通过后才会被
//! 解码并打包到最终位置；无论成功与否，临时目录都会在 [`StagingDir`] 被 drop 时删除。

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::error::DataError;
use super::verify::{Expected, ensure_verified};

/// 一个待下载的远程文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFileSpec {
    /// 保存到临时目录时使用的文件名
    pub filename: String,
    /// 下载地址
    pub url: String,
    /// 期望的校验值
    pub expected: Expected,
}

impl RemoteFileSpec {
    pub fn new(filename: impl Into<String>, url: impl Into<String>, expected: Expected) -> Self {
        Self {
            filename: filename.into(),
            url: url.into(),
            expected,
        }
    }
}

/// `download_*` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// 已下载并写入该路径
    Downloaded(PathBuf),
    /// 目标文件已存在，未做任何改动
    AlreadyExists(PathBuf),
}

impl DownloadOutcome {
    pub fn path(&self) -> &Path {
        match self {
            DownloadOutcome::Downloaded(p) | DownloadOutcome::AlreadyExists(p) => p,
        }
    }
}

/// 下载通道
///
/// 把 `url` 的响应体写入 `dest`，返回写入的字节数。
pub trait Transport {
    fn get(&self, url: &str, dest: &mut dyn Write) -> Result<u64, DataError>;
}

/// 基于 `ureq` 的阻塞 HTTP(S) 下载
#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    /// `timeout` 作用于建立连接和每次读取；只要数据还在持续到达，大文件下载不会被中断
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(timeout)
                .timeout_read(timeout)
                .build(),
        }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, dest: &mut dyn Write) -> Result<u64, DataError> {
        info!("正在下载 {url} ...");

        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| DataError::DownloadError(format!("HTTP 请求失败: {e}")))?;

        if response.status() != 200 {
            return Err(DataError::DownloadError(format!(
                "HTTP 状态码: {}",
                response.status()
            )));
        }

        let mut reader = response.into_reader();
        io::copy(&mut reader, dest)
            .map_err(|e| DataError::DownloadError(format!("读取响应失败: {e}")))
    }
}

/// 下载用的临时目录
///
/// 创建时要求目录不存在：已存在说明上一次下载异常中断，此时返回
/// [`DataError::ConflictError`]，既不会自动清理，也不会删除已有目录，交由用户手动处理。
/// 成功创建后，无论后续成功或失败，drop 时都会删除整个目录。
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, DataError> {
        let path = path.into();
        if path.exists() {
            return Err(DataError::ConflictError(path));
        }
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            warn!("删除临时目录 {:?} 失败: {e}", self.path);
        }
    }
}

/// 已下载并通过校验的文件（文件名 → 临时目录中的路径）
#[derive(Debug, Default, Clone)]
pub struct FetchedFiles {
    files: BTreeMap<String, PathBuf>,
}

impl FetchedFiles {
    pub fn path(&self, filename: &str) -> Option<&Path> {
        self.files.get(filename).map(PathBuf::as_path)
    }

    /// 读取整个文件内容
    pub fn read(&self, filename: &str) -> Result<Vec<u8>, DataError> {
        let path = self
            .path(filename)
            .ok_or_else(|| DataError::format(filename, "下载列表中没有该文件"))?;
        Ok(fs::read(path)?)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// 依次下载并校验所有文件
///
/// 任何一个文件下载或校验失败都会立即中止整批下载，不会把部分数据集交给后续步骤。
pub fn fetch(
    transport: &dyn Transport,
    staging: &StagingDir,
    specs: &[RemoteFileSpec],
) -> Result<FetchedFiles, DataError> {
    let mut fetched = FetchedFiles::default();
    for spec in specs {
        let dest = staging.path().join(&spec.filename);
        download_one(transport, spec, &dest)?;
        ensure_verified(&dest, &spec.expected)?;
        info!("校验通过: {} ({})", spec.filename, spec.expected);
        fetched.files.insert(spec.filename.clone(), dest);
    }
    Ok(fetched)
}

fn download_one(transport: &dyn Transport, spec: &RemoteFileSpec, dest: &Path) -> Result<(), DataError> {
    let mut writer = BufWriter::new(File::create(dest)?);
    let bytes = transport.get(&spec.url, &mut writer)?;
    writer.flush()?;
    info!("下载完成: {} ({bytes} 字节)", spec.filename);
    Ok(())
}

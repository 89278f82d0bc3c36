//! 数据集存储目录的解析与持久化
//!
//! 所有数据集都保存在同一个目录下。该目录记录在用户主目录的配置文件
//! `~/.datasets` 中（两行文本：注释行 + 绝对路径），没有配置文件时使用默认目录
//! `~/datasets`。

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use tempfile::NamedTempFile;

use super::error::DataError;

/// 配置文件名（位于用户主目录）
pub const CONFIG_FILE_NAME: &str = ".datasets";
/// 默认存储目录名（位于用户主目录）
pub const DEFAULT_DIR_NAME: &str = "datasets";
/// 覆盖配置文件位置的环境变量
pub const CONFIG_FILE_ENV: &str = "DATASETS_CONFIG_FILE";
/// 下载超时（秒）的环境变量
pub const HTTP_TIMEOUT_ENV: &str = "DATASETS_HTTP_TIMEOUT_SECS";

const CONFIG_HEADER: &str = "# ml_datasets 会把数据集写入以下目录:";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// `restore_default` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// 已恢复为默认目录
    Restored(PathBuf),
    /// 调用方未确认，未做任何改动
    NotConfirmed,
}

/// 存储目录配置
///
/// 持有配置文件与默认目录的位置，每次 [`get_path`](Self::get_path) 都重新读取配置文件，
/// 因此同一配置文件上的多个实例（或多个进程）总能看到最近一次 `set_path` 的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    config_file: PathBuf,
    default_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(config_file: impl Into<PathBuf>, default_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_file: config_file.into(),
            default_dir: default_dir.into(),
        }
    }

    /// 以 `home` 作为主目录：配置文件 `home/.datasets`，默认目录 `home/datasets`
    pub fn with_home(home: impl AsRef<Path>) -> Self {
        let home = home.as_ref();
        Self::new(home.join(CONFIG_FILE_NAME), home.join(DEFAULT_DIR_NAME))
    }

    /// 从环境解析配置位置
    ///
    /// `DATASETS_CONFIG_FILE` 存在时用它作为配置文件，否则使用 `~/.datasets`。
    /// 默认存储目录总是 `~/datasets`。
    pub fn from_env() -> Result<Self, DataError> {
        let home = dirs::home_dir()
            .ok_or_else(|| DataError::config(CONFIG_FILE_NAME, "无法确定用户主目录"))?;
        let mut config = Self::with_home(&home);
        if let Some(file) = env::var_os(CONFIG_FILE_ENV) {
            config.config_file = PathBuf::from(file);
        }
        Ok(config)
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn default_dir(&self) -> &Path {
        &self.default_dir
    }

    /// 解析数据集存储目录
    ///
    /// - 配置文件存在：返回其中记录的路径（不检查、不创建该目录）
    /// - 配置文件不存在：返回默认目录，必要时创建
    ///
    /// `verbose` 为 true 时以 info 级别输出解析结果。
    pub fn get_path(&self, verbose: bool) -> Result<PathBuf, DataError> {
        let path = if self.config_file.is_file() {
            self.read_config()?
        } else {
            fs::create_dir_all(&self.default_dir)?;
            self.default_dir.clone()
        };
        if verbose {
            info!("数据集将从 '{}' 加载", path.display());
        }
        Ok(path)
    }

    /// 指定数据集存储目录，并写入配置文件
    ///
    /// # 参数
    /// - `new_path`: 新的存储目录，相对路径按当前工作目录转为绝对路径
    /// - `create_dir`: true=目录不存在时创建
    ///
    /// # 返回
    /// 写入配置文件的绝对路径
    pub fn set_path(&self, new_path: impl AsRef<Path>, create_dir: bool) -> Result<PathBuf, DataError> {
        let new_path = absolute(new_path.as_ref())?;
        // 配置文件只保存 UTF-8 路径
        let line = new_path.to_str().ok_or_else(|| {
            DataError::config(&self.config_file, format!("路径不是有效的 UTF-8: {new_path:?}"))
        })?;
        if create_dir {
            fs::create_dir_all(&new_path)?;
        }
        self.write_config(line)?;
        self.get_path(true)?;
        Ok(new_path)
    }

    /// 删除配置文件，恢复默认目录
    ///
    /// 必须显式传入 `confirmed = true`，否则只给出警告。配置文件本来就不存在时视为已是默认状态。
    pub fn restore_default(&self, confirmed: bool) -> Result<RestoreOutcome, DataError> {
        if !confirmed {
            warn!("必须显式确认（confirmed = true）才会恢复默认目录");
            return Ok(RestoreOutcome::NotConfirmed);
        }
        if self.config_file.is_file() {
            fs::remove_file(&self.config_file)?;
        }
        Ok(RestoreOutcome::Restored(self.get_path(false)?))
    }

    fn read_config(&self) -> Result<PathBuf, DataError> {
        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| DataError::config(&self.config_file, e.to_string()))?;
        let lines: Vec<&str> = content.lines().collect();
        match lines.as_slice() {
            [_header, path] if !path.trim_end_matches('\r').is_empty() => {
                Ok(PathBuf::from(path.trim_end_matches('\r')))
            }
            _ => Err(DataError::config(
                &self.config_file,
                format!("期望 2 行（注释 + 路径），实际 {} 行", lines.len()),
            )),
        }
    }

    /// 先写临时文件再重命名，失败时不会留下写了一半的配置文件
    fn write_config(&self, line: &str) -> Result<(), DataError> {
        let parent = match self.config_file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = NamedTempFile::new_in(&parent)?;
        writeln!(tmp, "{CONFIG_HEADER}")?;
        write!(tmp, "{line}")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.config_file).map_err(|e| e.error)?;
        Ok(())
    }
}

/// 下载相关设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    /// 建立连接、以及两次读取之间允许的最长等待时间
    ///
    /// 只限制连接停滞的时间，不限制整个下载的总耗时。
    pub timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl FetchSettings {
    /// 读取 `DATASETS_HTTP_TIMEOUT_SECS`，未设置时使用默认值（60 秒）
    pub fn from_env() -> Result<Self, DataError> {
        match env::var(HTTP_TIMEOUT_ENV) {
            Ok(value) => Self::parse_timeout(&value),
            Err(_) => Ok(Self::default()),
        }
    }

    pub(crate) fn parse_timeout(value: &str) -> Result<Self, DataError> {
        let secs: u64 = value.trim().parse().map_err(|_| {
            DataError::config(HTTP_TIMEOUT_ENV, format!("无效的超时秒数: {value:?}"))
        })?;
        if secs == 0 {
            return Err(DataError::config(HTTP_TIMEOUT_ENV, "超时秒数必须大于 0"));
        }
        Ok(Self {
            timeout: Duration::from_secs(secs),
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf, DataError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}


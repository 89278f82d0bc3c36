//! 数据集缓存命令行
//!
//! ```text
//! datasets path
//! datasets set-path <DIR> [--mkdir]
//! datasets restore-default [--yes]
//! datasets list
//! datasets info <NAME>
//! datasets download <NAME>
//! datasets load <NAME> [--file <FILE>]
//! ```

use std::env;
use std::process::ExitCode;

use ml_datasets::data::{
    DataError, DatasetKind, DatasetStore, DownloadOutcome, RestoreOutcome, descriptor, registry,
};

const USAGE: &str = "用法:
    datasets path
    datasets set-path <DIR> [--mkdir]
    datasets restore-default [--yes]
    datasets list
    datasets info <NAME>
    datasets download <NAME>
    datasets load <NAME> [--file <FILE>]

NAME: cifar10 | mnist | fashion_mnist";

/// 解析后的命令
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Path,
    SetPath { dir: String, mkdir: bool },
    RestoreDefault { yes: bool },
    List,
    Info(DatasetKind),
    Download(DatasetKind),
    Load { kind: DatasetKind, file: Option<String> },
}

fn parse_cli<I>(mut args: I) -> Result<Command, String>
where
    I: Iterator<Item = String>,
{
    let mut flags = Vec::new();
    let mut file = None;
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--file" => file = Some(args.next().ok_or("--file 需要一个文件名")?),
            "--mkdir" | "--yes" => flags.push(arg),
            _ if arg.starts_with("--") => return Err(format!("未知选项 {arg}")),
            _ => positional.push(arg),
        }
    }

    let kind = |i: usize| -> Result<DatasetKind, String> {
        positional
            .get(i)
            .ok_or_else(|| "缺少数据集名称".to_string())?
            .parse()
    };
    let has = |flag: &str| flags.iter().any(|f| f == flag);

    match positional.first().map(String::as_str) {
        Some("path") => Ok(Command::Path),
        Some("set-path") => Ok(Command::SetPath {
            dir: positional.get(1).cloned().ok_or("缺少目录参数")?,
            mkdir: has("--mkdir"),
        }),
        Some("restore-default") => Ok(Command::RestoreDefault { yes: has("--yes") }),
        Some("list") => Ok(Command::List),
        Some("info") => Ok(Command::Info(kind(1)?)),
        Some("download") => Ok(Command::Download(kind(1)?)),
        Some("load") => Ok(Command::Load {
            kind: kind(1)?,
            file,
        }),
        Some(other) => Err(format!("未知命令 {other}")),
        None => Err("缺少命令".to_string()),
    }
}

fn run(command: Command) -> Result<(), DataError> {
    let store = DatasetStore::open()?;
    match command {
        Command::Path => println!("{}", store.get_path(true)?.display()),
        Command::SetPath { dir, mkdir } => {
            let path = store.set_path(dir, mkdir)?;
            println!("数据集目录已设置为 {}", path.display());
        }
        Command::RestoreDefault { yes } => match store.restore_default_path(yes)? {
            RestoreOutcome::Restored(path) => println!("已恢复默认目录 {}", path.display()),
            RestoreOutcome::NotConfirmed => {
                println!("必须显式指定 `datasets restore-default --yes` 才会恢复默认目录")
            }
        },
        Command::List => {
            let dir = store.get_path(false)?;
            for d in registry() {
                let cached = dir.join(d.default_filename).is_file();
                println!(
                    "{:<14} {:<22} {}",
                    d.name(),
                    d.default_filename,
                    if cached { "已缓存" } else { "未下载" }
                );
            }
        }
        Command::Info(kind) => {
            let json = serde_json::to_string_pretty(descriptor(kind))
                .map_err(|e| DataError::FormatError {
                    file: kind.name().to_string(),
                    reason: e.to_string(),
                })?;
            println!("{json}");
        }
        Command::Download(kind) => match store.download(kind)? {
            DownloadOutcome::Downloaded(path) => println!("已保存到 {}", path.display()),
            DownloadOutcome::AlreadyExists(path) => println!("文件已存在:\n\t{}", path.display()),
        },
        Command::Load { kind, file } => {
            let arrays = store.load(kind, file.as_deref())?;
            println!("x_train: {:?}", arrays.x_train.shape());
            println!("y_train: {:?}", arrays.y_train.shape());
            println!("x_test:  {:?}", arrays.x_test.shape());
            println!("y_test:  {:?}", arrays.y_test.shape());
            println!("labels:  {:?}", kind.labels());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let command = match parse_cli(env::args().skip(1)) {
        Ok(command) => command,
        Err(msg) => {
            eprintln!("{msg}\n\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("错误: {e}");
            ExitCode::FAILURE
        }
    }
}

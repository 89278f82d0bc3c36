/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 数据集缓存集成测试
 *                 验证：自定义下载通道 + 下载/校验/解码/打包 + 从缓存加载 的完整流程
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 */

use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;

use flate2::Compression;
use flate2::write::GzEncoder;
use ml_datasets::data::verify::{Expected, compute_md5};
use ml_datasets::data::{
    DataError, DatasetKind, DatasetStore, DownloadOutcome, RemoteFileSpec, StorageConfig,
    Transport, descriptor,
};

/// 从内存返回文件内容的下载通道
#[derive(Default)]
struct FixtureTransport {
    files: HashMap<String, Vec<u8>>,
    calls: Mutex<usize>,
}

impl FixtureTransport {
    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl Transport for FixtureTransport {
    fn get(&self, url: &str, dest: &mut dyn Write) -> Result<u64, DataError> {
        *self.calls.lock().unwrap() += 1;
        let body = self
            .files
            .get(url)
            .ok_or_else(|| DataError::DownloadError(format!("404: {url}")))?;
        dest.write_all(body)?;
        Ok(body.len() as u64)
    }
}

fn gzip(raw: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw).unwrap();
    encoder.finish().unwrap()
}

fn idx(magic_type: u8, dims: &[u32], body: &[u8]) -> Vec<u8> {
    let mut out = vec![0, 0, 8, magic_type];
    for d in dims {
        out.extend_from_slice(&d.to_be_bytes());
    }
    out.extend_from_slice(body);
    out
}

/// 4 张训练图、1 张测试图，像素值按样本序号填充
fn fashion_payload() -> HashMap<&'static str, Vec<u8>> {
    let train_pixels: Vec<u8> = (0..4u8).flat_map(|i| vec![i * 10; 784]).collect();
    let test_pixels = vec![255u8; 784];
    HashMap::from([
        ("train-images-idx3-ubyte.gz", gzip(&idx(3, &[4, 28, 28], &train_pixels))),
        ("train-labels-idx1-ubyte.gz", gzip(&idx(1, &[4], &[9, 0, 5, 1]))),
        ("t10k-images-idx3-ubyte.gz", gzip(&idx(3, &[1, 28, 28], &test_pixels))),
        ("t10k-labels-idx1-ubyte.gz", gzip(&idx(1, &[1], &[8]))),
    ])
}

#[test]
fn test_fashion_mnist_pipeline() -> Result<(), DataError> {
    let home = tempfile::tempdir()?;
    let payload = fashion_payload();

    // 沿用内置描述符的文件名与解码规则，只替换下载地址与校验值
    let mut fashion = descriptor(DatasetKind::FashionMnist).clone();
    let mut transport = FixtureTransport::default();
    for spec in fashion.remote_files.iter_mut() {
        let body = &payload[spec.filename.as_str()];
        let url = format!("fixture://{}", spec.filename);
        transport.files.insert(url.clone(), body.clone());
        *spec = RemoteFileSpec::new(spec.filename.clone(), url, Expected::Md5(compute_md5(body)));
    }

    let store = DatasetStore::with_transport(StorageConfig::with_home(home.path()), transport);

    let outcome = store.download_descriptor(&fashion)?;
    assert!(matches!(outcome, DownloadOutcome::Downloaded(_)));
    assert_eq!(store.transport().calls(), 4);

    let again = store.download_descriptor(&fashion)?;
    assert!(matches!(again, DownloadOutcome::AlreadyExists(_)));
    assert_eq!(store.transport().calls(), 4);

    let arrays = store.load_fashion_mnist(None)?;
    assert_eq!(arrays.x_train.shape(), &[4, 1, 28, 28]);
    assert_eq!(arrays.x_train[[2, 0, 14, 14]], 20);
    assert_eq!(arrays.x_test[[0, 0, 0, 0]], 255);
    assert_eq!(arrays.y_train.to_vec(), vec![9, 0, 5, 1]);

    let labels = DatasetKind::FashionMnist.labels();
    assert_eq!(labels[arrays.y_train[0] as usize], "Ankle boot");
    assert_eq!(labels[arrays.y_test[0] as usize], "Bag");
    Ok(())
}

#[test]
fn test_storage_path_round_trip() -> Result<(), DataError> {
    let home = tempfile::tempdir()?;
    let store = DatasetStore::with_transport(
        StorageConfig::with_home(home.path()),
        FixtureTransport::default(),
    );

    let default_dir = store.get_path(true)?;
    assert_eq!(default_dir, home.path().join("datasets"));

    let custom = store.set_path(home.path().join("cache"), true)?;
    assert_eq!(store.get_path(false)?, custom);

    store.restore_default_path(true)?;
    assert_eq!(store.get_path(false)?, default_dir);

    let missing = store.load_cifar10(None);
    assert!(matches!(missing, Err(DataError::NotFoundError { .. })));
    assert_eq!(store.transport().calls(), 0);
    Ok(())
}

mod config;

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::download::Transport;
use crate::data::error::DataError;

/// 内存中的下载通道，记录每次请求的 url
#[derive(Default)]
pub(super) struct MemoryTransport {
    files: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl MemoryTransport {
    pub(super) fn with_file(mut self, url: &str, body: Vec<u8>) -> Self {
        self.files.insert(url.to_string(), body);
        self
    }

    pub(super) fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Transport for MemoryTransport {
    fn get(&self, url: &str, dest: &mut dyn Write) -> Result<u64, DataError> {
        self.requests.borrow_mut().push(url.to_string());
        let body = self
            .files
            .get(url)
            .ok_or_else(|| DataError::DownloadError("HTTP 状态码: 404".to_string()))?;
        dest.write_all(body)?;
        Ok(body.len() as u64)
    }
}

/// 构造 IDX 图像文件：magic [0,0,8,3] + N, H, W + 像素
pub(super) fn idx_images(n: u32, height: u32, width: u32, pixels: &[u8]) -> Vec<u8> {
    let mut out = vec![0, 0, 8, 3];
    for dim in [n, height, width] {
        out.extend_from_slice(&dim.to_be_bytes());
    }
    out.extend_from_slice(pixels);
    out
}

/// 构造 IDX 标签文件：magic [0,0,8,1] + N + 标签
pub(super) fn idx_labels(labels: &[u8]) -> Vec<u8> {
    let mut out = vec![0, 0, 8, 1];
    out.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    out.extend_from_slice(labels);
    out
}

pub(super) fn gzip(raw: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw).unwrap();
    encoder.finish().unwrap()
}

pub(super) fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = vec![0u8; len];
    rng.fill(out.as_mut_slice());
    out
}

/// 取值在 [0, num_classes) 内的随机标签
pub(super) fn random_labels(len: usize, num_classes: u8, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(0..num_classes)).collect()
}

//! `.npy` v1.0 数组编码（仅覆盖导出用到的三种 dtype）。

const MAGIC: &[u8] = b"\x93NUMPY";
/// magic(6) + 版本(2) + 头长度(2)
const PREAMBLE_LEN: usize = 10;
const HEADER_ALIGN: usize = 64;

/// 一个待写出的 C 顺序 numpy 数组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpyArray {
    pub descr: String,
    pub shape: Vec<usize>,
    pub data: Vec<u8>,
}

impl NpyArray {
    /// 将若干 `side×side` 的 u8 栅格堆叠为 `(N, side, side)`
    pub fn stacked_u8(side: usize, rasters: &[Vec<u8>]) -> Self {
        let mut data = Vec::with_capacity(rasters.len() * side * side);
        for r in rasters {
            data.extend_from_slice(r);
        }
        Self {
            descr: "|u1".to_string(),
            shape: vec![rasters.len(), side, side],
            data,
        }
    }

    /// 一维小端 int64
    pub fn i64_vector(values: &[i64]) -> Self {
        Self {
            descr: "<i8".to_string(),
            shape: vec![values.len()],
            data: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    /// 一维定长 Unicode（UTF-32LE，按最长字符串补零）
    pub fn unicode_vector(values: &[String]) -> Self {
        let width = values
            .iter()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0)
            .max(1);
        let mut data = Vec::with_capacity(values.len() * width * 4);
        for s in values {
            let mut n = 0;
            for c in s.chars() {
                data.extend_from_slice(&(c as u32).to_le_bytes());
                n += 1;
            }
            data.resize(data.len() + (width - n) * 4, 0);
        }
        Self {
            descr: format!("<U{width}"),
            shape: vec![values.len()],
            data,
        }
    }

    fn shape_literal(&self) -> String {
        match self.shape.as_slice() {
            [n] => format!("({n},)"),
            dims => format!(
                "({})",
                dims.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    fn header(&self) -> String {
        let dict = format!(
            "{{'descr': '{}', 'fortran_order': False, 'shape': {}, }}",
            self.descr,
            self.shape_literal()
        );
        // 头部（含结尾换行）补空格，使数据区起点按 64 字节对齐
        let unpadded = PREAMBLE_LEN + dict.len() + 1;
        let pad = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
        let mut header = dict;
        header.push_str(&" ".repeat(pad));
        header.push('\n');
        header
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let header = self.header();
        let mut out = Vec::with_capacity(PREAMBLE_LEN + header.len() + self.data.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&[1, 0]);
        out.extend_from_slice(&(header.len() as u16).to_le_bytes());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(&self.data);
        out
    }
}

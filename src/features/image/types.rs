/// 输入不带 scheme 前缀时，归一化输出使用的 data URI 头
pub const DEFAULT_SCHEME_TAG: &str = "data:image/png;base64";

/// 归一化目标边长（仅支持 28 与 280 两档）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetSize {
    /// 28×28，提交入库与默认导出尺寸
    #[default]
    Small,
    /// 280×280
    Large,
}

impl TargetSize {
    /// 边长（像素）
    pub const fn side(self) -> u32 {
        match self {
            TargetSize::Small => 28,
            TargetSize::Large => 280,
        }
    }
}

impl TryFrom<u32> for TargetSize {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            28 => Ok(TargetSize::Small),
            280 => Ok(TargetSize::Large),
            other => Err(format!("不支持的尺寸 {other}（仅支持 28 或 280）")),
        }
    }
}

impl From<TargetSize> for u32 {
    fn from(value: TargetSize) -> Self {
        value.side()
    }
}

impl std::str::FromStr for TargetSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u32 = s
            .trim()
            .parse()
            .map_err(|_| format!("无效的尺寸: {s}"))?;
        TargetSize::try_from(n)
    }
}

impl std::fmt::Display for TargetSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.side())
    }
}

/// 单通道灰度栅格（行优先，`side * side` 个字节）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayRaster {
    pub side: u32,
    pub pixels: Vec<u8>,
}

impl GrayRaster {
    /// 以 `(rows, cols)` 表示的形状
    pub fn shape(&self) -> (usize, usize) {
        (self.side as usize, self.side as usize)
    }
}

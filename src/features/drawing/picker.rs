use std::sync::Mutex;

use rand::{Rng, SeedableRng, rngs::StdRng};

/// 下一轮提示数字的随机来源。持有独立 RNG，便于测试时注入固定种子。
pub struct DigitPicker {
    rng: Mutex<StdRng>,
}

impl DigitPicker {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// 在 0..=9 内均匀取值
    pub fn next_digit(&self) -> u8 {
        // 锁中毒只意味着另一线程在取数时 panic，RNG 状态仍可用
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..=9)
    }
}

impl Default for DigitPicker {
    fn default() -> Self {
        Self::new()
    }
}

//! 设置数值边界
//!
//! 边界只在写入入口处强制执行；读取路径不重新钳制存储值

pub const FONT_SIZE_MIN: i32 = 12;
pub const FONT_SIZE_MAX: i32 = 32;
pub const FONT_SIZE_STEP: i32 = 2;
pub const LINE_HEIGHT_MIN: f64 = 1.0;
pub const LINE_HEIGHT_MAX: f64 = 2.5;
pub const MARGIN_MIN: i32 = 0;
pub const MARGIN_MAX: i32 = 100;

/// clamp(v, lo, hi) = max(lo, min(v, hi))
pub fn clamp<T: PartialOrd>(value: T, lo: T, hi: T) -> T {
    let upper = if value < hi { value } else { hi };
    if upper > lo {
        upper
    } else {
        lo
    }
}

pub fn clamp_font_size(value: i32) -> i32 {
    clamp(value, FONT_SIZE_MIN, FONT_SIZE_MAX)
}

pub fn clamp_line_height(value: f64) -> f64 {
    clamp(value, LINE_HEIGHT_MIN, LINE_HEIGHT_MAX)
}

pub fn clamp_margin(value: i32) -> i32 {
    clamp(value, MARGIN_MIN, MARGIN_MAX)
}

/// 按固定步长调整字号并钳制
pub fn step_font_size(current: i32, steps: i32) -> i32 {
    clamp_font_size(current.saturating_add(steps.saturating_mul(FONT_SIZE_STEP)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5, 0, 10), 5);
        assert_eq!(clamp(-5, 0, 10), 0);
        assert_eq!(clamp(50, 0, 10), 10);
        assert_eq!(clamp(1.75, 1.0, 2.5), 1.75);
    }

    #[test]
    fn test_step_font_size() {
        assert_eq!(step_font_size(16, 1), 18);
        assert_eq!(step_font_size(16, -1), 14);
        assert_eq!(step_font_size(31, 1), 32);
        assert_eq!(step_font_size(13, -1), 12);
        assert_eq!(step_font_size(i32::MAX, 1), 32);
    }
}

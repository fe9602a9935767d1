/// Integer division of non-negative `x` by positive `d`, rounding up.
#[inline]
pub fn ceil_div(x: i32, d: i32) -> i32 {
    debug_assert!(x >= 0 && d > 0);
    (x + d - 1) / d
}

/// The smallest power of 2 that is at least `x`. Non-positive inputs give 1.
#[inline]
pub fn next_power_of_2(x: i32) -> i32 {
    if x <= 1 {
        1
    } else {
        (x as u32).next_power_of_two() as i32
    }
}

/// The exponent of the smallest power of 2 that is at least `x`.
#[inline]
pub fn ceil_log2(x: i32) -> u32 {
    next_power_of_2(x).trailing_zeros()
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

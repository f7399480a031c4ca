pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Map an `f32` opacity in `[0, 1]` to an 8-bit factor.
pub(crate) fn unit_to_u8(v: f32) -> u8 {
    ((v.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u8
}

/// Round a device-space coordinate range to whole pixel indices clamped into `[0, limit]`.
pub(crate) fn pixel_span(lo: f64, hi: f64, limit: u32) -> (u32, u32) {
    let lim = f64::from(limit);
    let a = lo.round().clamp(0.0, lim) as u32;
    let b = hi.round().clamp(0.0, lim) as u32;
    (a, b.max(a))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;

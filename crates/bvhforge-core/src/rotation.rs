//! Quaternion/Euler rotation math.
//!
//! All conversions go through an explicit 3x3 rotation matrix and closed-form
//! atan2/asin extraction. Quaternion components are ordered (w, x, y, z) and
//! Euler angles are in degrees throughout.
//!
//! Gimbal-lock inputs (middle axis within epsilon of +-90 degrees) are a
//! documented precision limitation of the closed-form extraction; they are
//! not handled specially.

use cgmath::Quaternion;

/// Axis ordering for Euler-angle extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EulerOrder {
    /// `R = Rz(z) * Ry(y) * Rx(x)`, extracted as `[z, y, x]`. Used for the
    /// per-joint rotation channels.
    Zyx,
    /// `R = Ry(yaw) * Rz(a) * Rx(b)`, extracted as `[a, yaw, b]`. The middle
    /// value isolates the heading about the vertical axis; used for the
    /// camera-relative decomposition.
    Yzx,
}

/// Row-major 3x3 rotation matrix built from a (possibly unnormalized)
/// quaternion. The inverse square length folds normalization into the
/// matrix entries.
fn rotation_matrix(q: Quaternion<f64>) -> [[f64; 3]; 3] {
    let (w, x, y, z) = (q.s, q.v.x, q.v.y, q.v.z);
    let invs = 1.0 / (w * w + x * x + y * y + z * z);

    let m00 = (x * x - y * y - z * z + w * w) * invs;
    let m11 = (-x * x + y * y - z * z + w * w) * invs;
    let m22 = (-x * x - y * y + z * z + w * w) * invs;
    let m10 = 2.0 * (x * y + z * w) * invs;
    let m01 = 2.0 * (x * y - z * w) * invs;
    let m20 = 2.0 * (x * z - y * w) * invs;
    let m02 = 2.0 * (x * z + y * w) * invs;
    let m21 = 2.0 * (y * z + x * w) * invs;
    let m12 = 2.0 * (y * z - x * w) * invs;

    [[m00, m01, m02], [m10, m11, m12], [m20, m21, m22]]
}

/// asin with the argument clamped to [-1, 1] so accumulated floating-point
/// error in matrix entries cannot produce NaN.
fn asin_deg(v: f64) -> f64 {
    v.clamp(-1.0, 1.0).asin().to_degrees()
}

fn atan2_deg(y: f64, x: f64) -> f64 {
    y.atan2(x).to_degrees()
}

/// Extracts ZYX Euler angles `[z, y, x]` in degrees from a rotation matrix.
fn extract_zyx(m: &[[f64; 3]; 3]) -> [f64; 3] {
    [
        atan2_deg(m[1][0], m[0][0]),
        asin_deg(-m[2][0]),
        atan2_deg(m[2][1], m[2][2]),
    ]
}

/// Converts a quaternion to Euler angles in degrees under the given order.
///
/// The quaternion is first canonicalized to a positive real part; q and -q
/// describe the same rotation, and pinning the representative keeps the
/// extracted angles continuous across sign flips in the input stream.
pub fn quat_to_euler(q: Quaternion<f64>, order: EulerOrder) -> [f64; 3] {
    let q = if q.s < 0.0 {
        Quaternion::new(-q.s, -q.v.x, -q.v.y, -q.v.z)
    } else {
        q
    };
    let m = rotation_matrix(q);

    match order {
        EulerOrder::Zyx => extract_zyx(&m),
        EulerOrder::Yzx => [
            asin_deg(m[1][0]),
            atan2_deg(-m[2][0], m[0][0]),
            atan2_deg(-m[1][2], m[1][1]),
        ],
    }
}

/// Composes a unit quaternion from ZYX Euler angles in degrees, the inverse
/// of `quat_to_euler(_, Zyx)`.
pub fn euler_to_quat(z: f64, y: f64, x: f64) -> Quaternion<f64> {
    let (sz, cz) = (z.to_radians() * 0.5).sin_cos();
    let (sy, cy) = (y.to_radians() * 0.5).sin_cos();
    let (sx, cx) = (x.to_radians() * 0.5).sin_cos();

    Quaternion::new(
        cz * cy * cx + sz * sy * sx,
        cz * cy * sx - sz * sy * cx,
        sz * cy * sx + cz * sy * cx,
        sz * cy * cx - cz * sy * sx,
    )
}

/// Re-expresses a YZX-decomposed rotation as ZYX Euler angles in degrees.
///
/// Rebuilds `Ry(yaw) * Rz(a) * Rx(b)` directly from the three angles,
/// bypassing a quaternion round-trip, and runs the ZYX extraction on it.
/// Callers substitute a residual value for `yaw` to re-express the
/// non-heading part of a rotation after peeling off a heading that was moved
/// to another joint.
pub fn reorder_residual(yaw: f64, a: f64, b: f64) -> [f64; 3] {
    let (s1, c1) = yaw.to_radians().sin_cos();
    let (s2, c2) = a.to_radians().sin_cos();
    let (s3, c3) = b.to_radians().sin_cos();

    let m = [
        [c1 * c2, s1 * s3 - c1 * c3 * s2, c3 * s1 + c1 * s2 * s3],
        [s2, c2 * c3, -c2 * s3],
        [-c2 * s1, c1 * s3 + c3 * s1 * s2, c1 * c3 - s1 * s2 * s3],
    ];
    extract_zyx(&m)
}

//! C ABI for hosts that load the engine as a native library.
//!
//! Quaternion arguments are positional, their meaning follows the order set
//! with [`pointer_set_quaternion_order`]. Calls returning `i32` report `0` on
//! success and `-1` on a rejected call or a null handle.

use super::{CalibrationMode, EngineConfig, OrientationEngine, QuaternionOrder, RawProcessResult};
use super::pointer_core::{PointerCore, VERSION};
use crate::data::Quaternion;
use std::convert::TryFrom;
use std::ffi::CString;
use std::os::raw::c_char;

pub type LogCallback = extern "C" fn(*const c_char);

fn status<E>(result: Result<(), E>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

fn positional(a: f32, b: f32, c: f32, d: f32) -> Quaternion {
    Quaternion {
        x: a,
        y: b,
        z: c,
        w: d,
    }
}

#[no_mangle]
pub extern "C" fn pointer_get_version() -> i32 {
    VERSION
}

#[no_mangle]
pub extern "C" fn pointer_create() -> *mut PointerCore {
    Box::into_raw(Box::new(PointerCore::default()))
}

/// # Safety
/// `ptr` must come from [`pointer_create`] and not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn pointer_destroy(ptr: *mut PointerCore) {
    if !ptr.is_null() {
        drop(Box::from_raw(ptr));
    }
}

/// # Safety
/// `ptr` must be null or a live handle from [`pointer_create`].
#[no_mangle]
pub unsafe extern "C" fn pointer_set_log_callback(
    ptr: *mut PointerCore,
    callback: Option<LogCallback>,
) -> i32 {
    let core = match ptr.as_mut() {
        Some(core) => core,
        None => return -1,
    };
    if let Some(callback) = callback {
        core.set_logger(Box::new(move |message: &str| {
            if let Ok(message) = CString::new(message) {
                callback(message.as_ptr());
            }
        }));
    }
    0
}

/// `0` selects wxyz, `1` selects xyzw.
///
/// # Safety
/// `ptr` must be null or a live handle from [`pointer_create`].
#[no_mangle]
pub unsafe extern "C" fn pointer_set_quaternion_order(ptr: *mut PointerCore, order: i32) -> i32 {
    let order = match order {
        0 => QuaternionOrder::Wxyz,
        1 => QuaternionOrder::Xyzw,
        _ => return -1,
    };
    match ptr.as_mut() {
        Some(core) => {
            core.set_quaternion_order(order);
            0
        }
        None => -1,
    }
}

/// # Safety
/// `ptr` must be null or a live handle from [`pointer_create`].
#[no_mangle]
pub unsafe extern "C" fn pointer_set_calibration_mode(ptr: *mut PointerCore, mode: i32) -> i32 {
    match (ptr.as_mut(), CalibrationMode::try_from(mode)) {
        (Some(core), Ok(mode)) => status(core.set_mode(mode)),
        _ => -1,
    }
}

/// # Safety
/// `ptr` must be null or a live handle from [`pointer_create`].
#[no_mangle]
pub unsafe extern "C" fn pointer_configure(
    ptr: *mut PointerCore,
    screen_width: f32,
    screen_height: f32,
    distance: f32,
    offset_x: f32,
    offset_y: f32,
    smoothing: f32,
) -> i32 {
    match ptr.as_mut() {
        Some(core) => {
            let config = EngineConfig {
                screen_width,
                screen_height,
                distance,
                offset_x,
                offset_y,
                smoothing,
                quaternion_order: core.quaternion_order(),
            };
            status(core.configure(&config))
        }
        None => -1,
    }
}

/// # Safety
/// `ptr` must be null or a live handle from [`pointer_create`].
#[no_mangle]
pub unsafe extern "C" fn pointer_calibrate_center(
    ptr: *mut PointerCore,
    a: f32,
    b: f32,
    c: f32,
    d: f32,
) -> i32 {
    match ptr.as_mut() {
        Some(core) => status(core.calibrate_center(&positional(a, b, c, d))),
        None => -1,
    }
}

/// # Safety
/// `ptr` must be null or a live handle from [`pointer_create`].
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn pointer_calibrate_corners(
    ptr: *mut PointerCore,
    tl_a: f32,
    tl_b: f32,
    tl_c: f32,
    tl_d: f32,
    br_a: f32,
    br_b: f32,
    br_c: f32,
    br_d: f32,
) -> i32 {
    match ptr.as_mut() {
        Some(core) => status(core.calibrate_corners(
            &positional(tl_a, tl_b, tl_c, tl_d),
            &positional(br_a, br_b, br_c, br_d),
        )),
        None => -1,
    }
}

/// A null handle yields an all zero, invalid record.
///
/// # Safety
/// `ptr` must be null or a live handle from [`pointer_create`].
#[no_mangle]
pub unsafe extern "C" fn pointer_process(
    ptr: *mut PointerCore,
    a: f32,
    b: f32,
    c: f32,
    d: f32,
) -> RawProcessResult {
    match ptr.as_mut() {
        Some(core) => match core.process(&positional(a, b, c, d)) {
            Ok(result) => RawProcessResult::from(result),
            Err(_) => RawProcessResult::default(),
        },
        None => RawProcessResult::default(),
    }
}

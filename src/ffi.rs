//! FFI bindings for the planetary hours engine
//!
//! This module provides C-compatible functions for calling the engine from other
//! languages. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `ph_free_string`.
//!
//! Optional string arguments may be NULL. When the evaluation instant `at` is
//! NULL the current time is used, expressed in the location's offset.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::{DateTime, FixedOffset, Utc};

use crate::config::EngineConfig;
use crate::encoder::ReportEncoder;
use crate::pipeline::HourEngine;
use crate::profile::Profile;
use crate::types::{parse_date, parse_instant, utc_offset, Location, NatalChart};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Read a mandatory string argument
unsafe fn required(ptr: *const c_char, name: &str) -> Result<String, String> {
    cstr_to_string(ptr).ok_or_else(|| format!("Invalid {name} string pointer"))
}

/// Resolve the evaluation instant in the given offset
fn evaluation_instant(
    at: Option<String>,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, String> {
    match at {
        Some(raw) => parse_instant(&raw)
            .map(|dt| dt.with_timezone(&offset))
            .map_err(|e| e.to_string()),
        None => Ok(Utc::now().with_timezone(&offset)),
    }
}

/// Turn a result into a returned string, recording the error on failure
fn finish(result: Result<String, String>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e);
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute a day of planetary hours and return the JSON payload.
///
/// # Safety
/// - `date` must be a valid null-terminated C string (`YYYY-MM-DD`).
/// - `natal_date`, `natal_time` and `at` must be valid C strings or NULL.
///   The natal fields are used only when both are given.
/// - Returns a newly allocated string that must be freed with `ph_free_string`.
/// - Returns NULL on error; call `ph_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ph_hours_for_day(
    date: *const c_char,
    latitude: f64,
    longitude: f64,
    utc_offset_minutes: i32,
    natal_date: *const c_char,
    natal_time: *const c_char,
    at: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let result = (|| {
        let date = parse_date(&required(date, "date")?).map_err(|e| e.to_string())?;
        let location = Location::new("", latitude, longitude, utc_offset_minutes)
            .map_err(|e| e.to_string())?;
        let natal = match (cstr_to_string(natal_date), cstr_to_string(natal_time)) {
            (Some(d), Some(t)) => Some(NatalChart::new(d, t)),
            _ => None,
        };
        let offset = utc_offset(utc_offset_minutes).map_err(|e| e.to_string())?;
        let at = evaluation_instant(cstr_to_string(at), offset)?;

        let report = HourEngine::new()
            .compute_day(date, &location, natal.as_ref(), &at)
            .map_err(|e| e.to_string())?;
        ReportEncoder::new()
            .encode_to_json(&report)
            .map_err(|e| e.to_string())
    })();

    finish(result)
}

// ============================================================================
// Engine API
// ============================================================================

/// Opaque handle to a configured HourEngine
pub struct HourEngineHandle {
    engine: HourEngine,
}

/// Create an engine from an optional JSON configuration.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string or NULL (defaults).
/// - Returns a pointer that must be freed with `ph_engine_free`.
/// - Returns NULL on error; call `ph_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ph_engine_new(config_json: *const c_char) -> *mut HourEngineHandle {
    clear_last_error();

    let config = match cstr_to_string(config_json) {
        Some(json) => match EngineConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        },
        None => EngineConfig::default(),
    };

    let handle = Box::new(HourEngineHandle {
        engine: HourEngine::with_config(config),
    });
    Box::into_raw(handle)
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `ph_engine_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn ph_engine_free(engine: *mut HourEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Compute a day for the location and natal data stored in a profile.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `ph_engine_new`.
/// - `profile_json` and `date` must be valid null-terminated C strings.
/// - `at` must be a valid C string or NULL.
/// - Returns a newly allocated string that must be freed with `ph_free_string`.
/// - Returns NULL on error; call `ph_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ph_engine_hours_for_profile(
    engine: *const HourEngineHandle,
    profile_json: *const c_char,
    date: *const c_char,
    at: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    let handle = &*engine;

    let result = (|| {
        let profile =
            Profile::from_json(&required(profile_json, "profile")?).map_err(|e| e.to_string())?;
        let location = profile
            .location
            .as_ref()
            .ok_or_else(|| "Profile has no saved location".to_string())?;
        let date = parse_date(&required(date, "date")?).map_err(|e| e.to_string())?;
        let at = evaluation_instant(
            cstr_to_string(at),
            location.offset().map_err(|e| e.to_string())?,
        )?;

        let report = handle
            .engine
            .compute_day(date, location, profile.natal.as_ref(), &at)
            .map_err(|e| e.to_string())?;
        ReportEncoder::new()
            .encode_to_json(&report)
            .map_err(|e| e.to_string())
    })();

    finish(result)
}

/// Positions of the seven planets at an instant, as a JSON array.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `ph_engine_new`.
/// - `at` must be a valid C string or NULL (now, UTC).
/// - Returns a newly allocated string that must be freed with `ph_free_string`.
/// - Returns NULL on error; call `ph_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ph_engine_positions(
    engine: *const HourEngineHandle,
    at: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    let handle = &*engine;

    let result = (|| {
        let at = match cstr_to_string(at) {
            Some(raw) => parse_instant(&raw).map_err(|e| e.to_string())?,
            None => DateTime::<FixedOffset>::from(Utc::now()),
        };
        let positions = handle.engine.positions(&at).map_err(|e| e.to_string())?;
        serde_json::to_string(&positions).map_err(|e| e.to_string())
    })();

    finish(result)
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by `ph_*` functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a `ph_*` function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn ph_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next `ph_*` call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn ph_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn ph_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

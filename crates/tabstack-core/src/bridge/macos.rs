//! macOS window server adapter.
//!
//! Enumeration and screen geometry come from Core Graphics (via xcap); frame
//! reads and writes go through the Accessibility API. Space queries need
//! private SPI and always answer `None`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::c_void;
use std::ptr;

use accessibility_sys::{
    AXError, AXUIElementCopyAttributeValue, AXUIElementCreateApplication,
    AXUIElementPerformAction, AXUIElementRef, AXUIElementSetAttributeValue,
    AXUIElementSetMessagingTimeout, AXValueCreate, AXValueGetValue, AXValueRef,
    kAXErrorAPIDisabled, kAXErrorCannotComplete, kAXErrorInvalidUIElement, kAXErrorSuccess,
    kAXFocusedWindowAttribute, kAXPositionAttribute, kAXRaiseAction, kAXSizeAttribute,
    kAXTitleAttribute, kAXValueTypeCGPoint, kAXValueTypeCGSize, kAXWindowsAttribute,
};
use core_foundation::array::{CFArray, CFArrayRef};
use core_foundation::base::{CFRelease, CFRetain, CFType, CFTypeRef, TCFType};
use core_foundation::boolean::CFBoolean;
use core_foundation::string::CFString;
use core_graphics::geometry::{CGPoint, CGSize};
use tracing::{debug, warn};

use super::{
    AccessibilityBridge, BridgeError, ScreenQuery, SpaceQuery, WindowEnumerator,
};
use crate::geometry::{Point, Rect};
use crate::window::{SpaceId, WindowId, WindowSnapshot};

/// Timeout for AX messaging (seconds)
const AX_MESSAGING_TIMEOUT: f32 = 1.0;

const AX_FULLSCREEN_ATTRIBUTE: &str = "AXFullScreen";

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    /// Maps an AX window element to its window server id.
    fn _AXUIElementGetWindow(element: AXUIElementRef, id: *mut u32) -> AXError;
}

/// Owned (+1 retained) AX element.
struct AxElement(AXUIElementRef);

impl AxElement {
    /// Take ownership of a +1 retained element.
    fn from_create_rule(element: AXUIElementRef) -> Option<Self> {
        (!element.is_null()).then_some(Self(element))
    }

    /// Retain an element borrowed from a container.
    fn from_get_rule(element: AXUIElementRef) -> Option<Self> {
        if element.is_null() {
            return None;
        }
        // SAFETY: element is a valid borrowed CF object; CFRetain gives us our own +1.
        unsafe { CFRetain(element as CFTypeRef) };
        Some(Self(element))
    }

    fn application(pid: i32) -> Option<Self> {
        // SAFETY: AXUIElementCreateApplication creates a +1 retained AXUIElementRef.
        let element = Self::from_create_rule(unsafe { AXUIElementCreateApplication(pid) })?;
        // SAFETY: element.0 is a valid AXUIElementRef we own.
        unsafe {
            AXUIElementSetMessagingTimeout(element.0, AX_MESSAGING_TIMEOUT);
        }
        Some(element)
    }

    fn window_id(&self) -> Option<WindowId> {
        let mut id: u32 = 0;
        // SAFETY: self.0 is a valid AX element and id is a valid out pointer.
        let result = unsafe { _AXUIElementGetWindow(self.0, &mut id) };
        (result == kAXErrorSuccess && id != 0).then_some(WindowId(id as u64))
    }

    fn copy_attribute(&self, attribute: &str) -> Result<CFType, AXError> {
        let cf_attr = CFString::new(attribute);
        let mut value: CFTypeRef = ptr::null();

        // SAFETY: Standard AXUIElementCopyAttributeValue (Copy Rule: +1 retained on success).
        let result = unsafe {
            AXUIElementCopyAttributeValue(self.0, cf_attr.as_concrete_TypeRef(), &mut value)
        };
        if result != kAXErrorSuccess || value.is_null() {
            return Err(result);
        }
        // SAFETY: value is a +1 retained CFTypeRef. wrap_under_create_rule takes ownership.
        Ok(unsafe { CFType::wrap_under_create_rule(value) })
    }

    fn set_attribute(&self, attribute: &str, value: CFTypeRef) -> Result<(), AXError> {
        let cf_attr = CFString::new(attribute);
        // SAFETY: Setting attribute value on a valid element with a valid CF value.
        let result =
            unsafe { AXUIElementSetAttributeValue(self.0, cf_attr.as_concrete_TypeRef(), value) };
        if result == kAXErrorSuccess {
            Ok(())
        } else {
            Err(result)
        }
    }
}

impl Clone for AxElement {
    fn clone(&self) -> Self {
        // SAFETY: self.0 is a valid element; CFRetain gives the clone its own +1.
        unsafe { CFRetain(self.0 as CFTypeRef) };
        Self(self.0)
    }
}

impl Drop for AxElement {
    fn drop(&mut self) {
        // SAFETY: We own a +1 reference to this element.
        unsafe { CFRelease(self.0 as *mut c_void) };
    }
}

fn map_ax_error(
    window: WindowId,
    attribute: &'static str,
    action: &'static str,
    error: AXError,
) -> BridgeError {
    if error == kAXErrorInvalidUIElement {
        BridgeError::StaleElement { window }
    } else if error == kAXErrorAPIDisabled {
        BridgeError::PermissionDenied
    } else {
        BridgeError::AttributeFailed {
            window,
            attribute,
            action,
            message: format!("AXError {}", error),
        }
    }
}

fn read_point(value: &CFType) -> Option<CGPoint> {
    let mut point = CGPoint::new(0.0, 0.0);
    // SAFETY: value is an AXValueRef holding a CGPoint; point is a valid out pointer.
    let ok = unsafe {
        AXValueGetValue(
            value.as_CFTypeRef() as AXValueRef,
            kAXValueTypeCGPoint,
            &mut point as *mut CGPoint as *mut c_void,
        )
    };
    ok.then_some(point)
}

fn read_size(value: &CFType) -> Option<CGSize> {
    let mut size = CGSize::new(0.0, 0.0);
    // SAFETY: value is an AXValueRef holding a CGSize; size is a valid out pointer.
    let ok = unsafe {
        AXValueGetValue(
            value.as_CFTypeRef() as AXValueRef,
            kAXValueTypeCGSize,
            &mut size as *mut CGSize as *mut c_void,
        )
    };
    ok.then_some(size)
}

fn window_geometry(w: &xcap::Window) -> Option<(u32, i32, i32, u32, u32)> {
    Some((w.id().ok()?, w.x().ok()?, w.y().ok()?, w.width().ok()?, w.height().ok()?))
}

/// Window server backed by the live macOS session.
#[derive(Default)]
pub struct MacWindowServer {
    elements: RefCell<HashMap<WindowId, AxElement>>,
    pids: RefCell<HashMap<WindowId, i32>>,
}

impl MacWindowServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the AX element for `window` among the windows of process `pid`.
    fn lookup(pid: i32, window: WindowId) -> Option<AxElement> {
        let app = AxElement::application(pid)?;
        let windows = app.copy_attribute(kAXWindowsAttribute).ok()?;
        // SAFETY: AXWindows holds a CFArray of AX elements. Get rule because
        // `windows` keeps its own reference alive for the duration.
        let array: CFArray<CFType> =
            unsafe { CFArray::wrap_under_get_rule(windows.as_CFTypeRef() as CFArrayRef) };

        array.iter().find_map(|item| {
            let element = AxElement::from_get_rule(item.as_CFTypeRef() as AXUIElementRef)?;
            (element.window_id() == Some(window)).then_some(element)
        })
    }

    /// Cached element for `window`, resolved through a fresh snapshot the
    /// first time the window is seen.
    fn element(&self, window: WindowId) -> Result<AxElement, BridgeError> {
        if let Some(element) = self.elements.borrow().get(&window) {
            return Ok(element.clone());
        }
        let pid = match self.pids.borrow().get(&window).copied() {
            Some(pid) => pid,
            None => self
                .snapshot()?
                .into_iter()
                .find(|w| w.id == window)
                .and_then(|w| w.pid)
                .ok_or(BridgeError::WindowNotFound { window })?,
        };
        self.acquire(window, pid)
    }

    fn acquire(&self, window: WindowId, pid: i32) -> Result<AxElement, BridgeError> {
        self.elements.borrow_mut().remove(&window);
        match Self::lookup(pid, window) {
            Some(element) => {
                debug!(
                    event = "core.bridge.element_acquired",
                    window_id = %window,
                    pid = pid
                );
                self.elements.borrow_mut().insert(window, element.clone());
                self.pids.borrow_mut().insert(window, pid);
                Ok(element)
            }
            None => {
                self.pids.borrow_mut().remove(&window);
                Err(BridgeError::WindowNotFound { window })
            }
        }
    }

    fn write_position(&self, window: WindowId, origin: Point) -> Result<(), BridgeError> {
        let element = self.element(window)?;
        let point = CGPoint::new(origin.x, origin.y);
        // SAFETY: AXValueCreate copies the CGPoint into a +1 retained AXValueRef.
        let value = unsafe {
            AXValueCreate(
                kAXValueTypeCGPoint,
                &point as *const CGPoint as *const c_void,
            )
        };
        if value.is_null() {
            return Err(map_ax_error(window, kAXPositionAttribute, "set", kAXErrorCannotComplete));
        }
        // SAFETY: value is +1 retained; CFType releases it on drop.
        let value = unsafe { CFType::wrap_under_create_rule(value as CFTypeRef) };
        element
            .set_attribute(kAXPositionAttribute, value.as_CFTypeRef())
            .map_err(|e| map_ax_error(window, kAXPositionAttribute, "set", e))
    }

    fn write_size(&self, window: WindowId, width: f64, height: f64) -> Result<(), BridgeError> {
        let element = self.element(window)?;
        let size = CGSize::new(width, height);
        // SAFETY: AXValueCreate copies the CGSize into a +1 retained AXValueRef.
        let value = unsafe {
            AXValueCreate(kAXValueTypeCGSize, &size as *const CGSize as *const c_void)
        };
        if value.is_null() {
            return Err(map_ax_error(window, kAXSizeAttribute, "set", kAXErrorCannotComplete));
        }
        // SAFETY: value is +1 retained; CFType releases it on drop.
        let value = unsafe { CFType::wrap_under_create_rule(value as CFTypeRef) };
        element
            .set_attribute(kAXSizeAttribute, value.as_CFTypeRef())
            .map_err(|e| map_ax_error(window, kAXSizeAttribute, "set", e))
    }
}

impl AccessibilityBridge for MacWindowServer {
    fn frame(&self, window: WindowId) -> Result<Rect, BridgeError> {
        let element = self.element(window)?;
        let position = element
            .copy_attribute(kAXPositionAttribute)
            .map_err(|e| map_ax_error(window, kAXPositionAttribute, "read", e))?;
        let size = element
            .copy_attribute(kAXSizeAttribute)
            .map_err(|e| map_ax_error(window, kAXSizeAttribute, "read", e))?;

        match (read_point(&position), read_size(&size)) {
            (Some(p), Some(s)) => Ok(Rect::new(p.x, p.y, s.width, s.height)),
            _ => Err(BridgeError::AttributeFailed {
                window,
                attribute: kAXPositionAttribute,
                action: "decode",
                message: "AXValue did not hold the expected geometry".to_string(),
            }),
        }
    }

    fn set_frame(&mut self, window: WindowId, frame: Rect) -> Result<(), BridgeError> {
        // Position, size, position: some apps clamp the size against the old origin
        self.write_position(window, frame.origin())?;
        self.write_size(window, frame.width, frame.height)?;
        self.write_position(window, frame.origin())
    }

    fn set_position(&mut self, window: WindowId, origin: Point) -> Result<(), BridgeError> {
        self.write_position(window, origin)
    }

    fn title(&self, window: WindowId) -> Result<String, BridgeError> {
        let value = self
            .element(window)?
            .copy_attribute(kAXTitleAttribute)
            .map_err(|e| map_ax_error(window, kAXTitleAttribute, "read", e))?;
        Ok(value
            .downcast::<CFString>()
            .map(|s| s.to_string())
            .unwrap_or_default())
    }

    fn is_fullscreen(&self, window: WindowId) -> Result<bool, BridgeError> {
        let value = self
            .element(window)?
            .copy_attribute(AX_FULLSCREEN_ATTRIBUTE)
            .map_err(|e| map_ax_error(window, AX_FULLSCREEN_ATTRIBUTE, "read", e))?;
        Ok(value.downcast::<CFBoolean>().map(bool::from).unwrap_or(false))
    }

    fn window_exists(&self, window: WindowId) -> bool {
        match xcap::Window::all() {
            Ok(windows) => windows
                .iter()
                .any(|w| w.id().ok().map(|id| id as u64) == Some(window.0)),
            Err(e) => {
                debug!(
                    event = "core.bridge.window_exists_check_failed",
                    window_id = %window,
                    error = %e
                );
                false
            }
        }
    }

    fn focused_window(&self, pid: i32) -> Result<Option<WindowId>, BridgeError> {
        let Some(app) = AxElement::application(pid) else {
            return Ok(None);
        };
        let focused = match app.copy_attribute(kAXFocusedWindowAttribute) {
            Ok(value) => value,
            Err(e) if e == kAXErrorAPIDisabled => return Err(BridgeError::PermissionDenied),
            Err(_) => return Ok(None),
        };
        Ok(AxElement::from_get_rule(focused.as_CFTypeRef() as AXUIElementRef)
            .and_then(|element| element.window_id()))
    }

    fn raise(&mut self, window: WindowId) -> Result<(), BridgeError> {
        let element = self.element(window)?;
        let action = CFString::new(kAXRaiseAction);
        // SAFETY: Performing an action on a valid window element.
        let result = unsafe { AXUIElementPerformAction(element.0, action.as_concrete_TypeRef()) };
        if result != kAXErrorSuccess {
            debug!(
                event = "core.bridge.raise_trying_main",
                window_id = %window,
                ax_raise_error = result
            );
            // Some apps respond to AXMain instead
            element
                .set_attribute("AXMain", CFBoolean::true_value().as_CFTypeRef())
                .map_err(|e| map_ax_error(window, "AXMain", "set", e))?;
        }
        Ok(())
    }

    fn reacquire(&mut self, window: WindowId, pid: i32) -> Result<(), BridgeError> {
        self.acquire(window, pid).map(|_| ())
    }
}

impl WindowEnumerator for MacWindowServer {
    fn snapshot(&self) -> Result<Vec<WindowSnapshot>, BridgeError> {
        let windows = xcap::Window::all().map_err(|e| BridgeError::EnumerationFailed {
            message: e.to_string(),
        })?;

        let mut skipped_count = 0;
        let snapshot: Vec<WindowSnapshot> = windows
            .into_iter()
            .filter_map(|w| {
                let Some((id, x, y, width, height)) = window_geometry(&w) else {
                    skipped_count += 1;
                    return None;
                };
                // Tiny windows are menu extras and other system chrome
                if width < 10 || height < 10 || w.is_minimized().unwrap_or(false) {
                    return None;
                }

                // xcap returns u32 PIDs, but the Accessibility API uses i32.
                let pid = w.pid().ok().and_then(|p| {
                    i32::try_from(p)
                        .inspect_err(|e| {
                            warn!(
                                event = "core.bridge.pid_conversion_failed",
                                window_id = id,
                                pid_u32 = p,
                                error = %e,
                            );
                        })
                        .ok()
                });

                Some(WindowSnapshot {
                    id: WindowId(id as u64),
                    pid,
                    frame: Rect::new(x as f64, y as f64, width as f64, height as f64),
                    title: w.title().unwrap_or_default(),
                    app_name: w.app_name().unwrap_or_default(),
                    // CG has no fullscreen flag; callers refine through is_fullscreen
                    is_fullscreen: false,
                })
            })
            .collect();

        if skipped_count > 0 {
            warn!(
                event = "core.bridge.snapshot_incomplete",
                skipped_count = skipped_count,
                returned_count = snapshot.len()
            );
        }
        debug!(event = "core.bridge.snapshot_completed", count = snapshot.len());
        Ok(snapshot)
    }
}

impl SpaceQuery for MacWindowServer {
    fn space_id(&self, _window: WindowId) -> Option<SpaceId> {
        None
    }
}

impl ScreenQuery for MacWindowServer {
    /// Bounds of the monitor containing the centre of `frame`.
    ///
    /// Menu bar and Dock insets are not subtracted.
    fn visible_frame(&self, frame: &Rect) -> Option<Rect> {
        let monitors = match xcap::Monitor::all() {
            Ok(monitors) => monitors,
            Err(e) => {
                warn!(event = "core.bridge.monitor_enumeration_failed", error = %e);
                return None;
            }
        };
        let center = Point::new(frame.x + frame.width / 2.0, frame.y + frame.height / 2.0);

        let bounds: Vec<Rect> = monitors
            .iter()
            .filter_map(|m| {
                Some(Rect::new(
                    m.x().ok()? as f64,
                    m.y().ok()? as f64,
                    m.width().ok()? as f64,
                    m.height().ok()? as f64,
                ))
            })
            .collect();

        bounds
            .iter()
            .find(|b| {
                center.x >= b.x && center.x < b.max_x() && center.y >= b.y && center.y < b.max_y()
            })
            .or_else(|| bounds.first())
            .copied()
    }
}

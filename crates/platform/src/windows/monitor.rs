use displayhop_core::platform::MonitorManager;
use displayhop_core::{DisplayDevice, Dpi, PlatformError, Rect};

use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{BOOL, LPARAM, RECT};
use windows::Win32::Graphics::Gdi::*;
use windows::Win32::UI::HiDpi::{GetDpiForMonitor, MDT_EFFECTIVE_DPI};

/// Windows 显示器管理器（基于 EnumDisplayMonitors）
pub struct WinMonitorManager;

impl Default for WinMonitorManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WinMonitorManager {
    pub fn new() -> Self {
        Self
    }
}

impl MonitorManager for WinMonitorManager {
    fn enumerate_monitors(&self) -> Result<Vec<DisplayDevice>, PlatformError> {
        let mut devices: Vec<DisplayDevice> = Vec::new();

        let ok = unsafe {
            let data = LPARAM(&mut devices as *mut Vec<DisplayDevice> as isize);
            EnumDisplayMonitors(None, None, Some(enum_monitor_proc), data)
        };
        if !ok.as_bool() {
            return Err(PlatformError::Native("EnumDisplayMonitors 调用失败".into()));
        }

        Ok(devices)
    }

    fn query_monitor_dpi(&self, device: &DisplayDevice) -> Option<Dpi> {
        let hmonitor = HMONITOR(device.native_id as *mut _);
        let (mut x, mut y) = (0u32, 0u32);
        unsafe { GetDpiForMonitor(hmonitor, MDT_EFFECTIVE_DPI, &mut x, &mut y).ok()? };
        Some(Dpi::new(x, y))
    }

    fn query_device_dpi(&self, device: &DisplayDevice) -> Option<Dpi> {
        let name: Vec<u16> = device.device_name.encode_utf16().chain(Some(0)).collect();
        unsafe {
            let hdc = CreateDCW(w!("DISPLAY"), PCWSTR(name.as_ptr()), PCWSTR::null(), None);
            if hdc.is_invalid() {
                return None;
            }
            let x = GetDeviceCaps(hdc, LOGPIXELSX);
            let y = GetDeviceCaps(hdc, LOGPIXELSY);
            let _ = DeleteDC(hdc);
            (x > 0 && y > 0).then(|| Dpi::new(x as u32, y as u32))
        }
    }
}

unsafe extern "system" fn enum_monitor_proc(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _lprc_clip: *mut RECT,
    data: LPARAM,
) -> BOOL {
    let devices = &mut *(data.0 as *mut Vec<DisplayDevice>);

    let mut info = MONITORINFOEXW::default();
    info.monitorInfo.cbSize = std::mem::size_of::<MONITORINFOEXW>() as u32;

    if GetMonitorInfoW(hmonitor, &mut info as *mut MONITORINFOEXW as *mut MONITORINFO).as_bool() {
        let to_rect = |r: &RECT| Rect::new(r.left, r.top, r.right - r.left, r.bottom - r.top);
        let name_len = info
            .szDevice
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(info.szDevice.len());

        devices.push(DisplayDevice {
            native_id: hmonitor.0 as isize,
            full_rect: to_rect(&info.monitorInfo.rcMonitor),
            work_area: to_rect(&info.monitorInfo.rcWork),
            is_primary: info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0,
            device_name: String::from_utf16_lossy(&info.szDevice[..name_len]),
        });
    } else {
        log::warn!("无法读取显示器 {:?} 的信息", hmonitor.0);
    }

    BOOL(1) // 继续枚举
}

use serialport::SerialPortType;
use std::fs;
use std::path::{Path, PathBuf};

// FTDI FT230X bridge fitted to the timing receiver evaluation boards.
pub const RECEIVER_USB_VID: u16 = 0x0403;
pub const RECEIVER_USB_PID: u16 = 0x6015;

#[cfg(target_os = "linux")]
const USB_SERIAL_SYSFS: &str = "/sys/bus/usb-serial/devices";

#[cfg(target_os = "windows")]
pub const DEFAULT_PORT: &str = "COM3";
#[cfg(target_os = "macos")]
pub const DEFAULT_PORT: &str = "/dev/cu.usbserial";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

// Use the explicit port when given; otherwise look for the receiver's USB bridge,
// falling back to the platform default path.
pub fn resolve_port(explicit: Option<&str>) -> String {
    if let Some(port) = explicit.filter(|port| !port.trim().is_empty()) {
        return port.to_string();
    }

    match find_usb_port(RECEIVER_USB_VID, RECEIVER_USB_PID) {
        Some(port) => {
            tracing::info!(port = %port, "found receiver USB serial bridge");
            port
        }
        None => {
            tracing::info!(
                port = DEFAULT_PORT,
                "receiver USB serial bridge not found; using default port"
            );
            DEFAULT_PORT.to_string()
        }
    }
}

fn find_usb_port(vid: u16, pid: u16) -> Option<String> {
    match serialport::available_ports() {
        Ok(ports) => {
            let found = ports.into_iter().find_map(|info| match info.port_type {
                SerialPortType::UsbPort(usb) if usb.vid == vid && usb.pid == pid => {
                    Some(info.port_name)
                }
                _ => None,
            });
            if found.is_some() {
                return found;
            }
        }
        Err(err) => tracing::debug!(error = %err, "serial port enumeration failed"),
    }

    #[cfg(target_os = "linux")]
    {
        scan_usb_serial_sysfs(Path::new(USB_SERIAL_SYSFS), Path::new("/dev"), vid, pid)
            .map(|path| path.display().to_string())
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

// Walk `<sysfs_root>/<ttyUSBn>/device/uevent` looking for `PRODUCT=<vid>/<pid>/...`
// and return `<dev_root>/<ttyUSBn>` when that device node exists.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn scan_usb_serial_sysfs(sysfs_root: &Path, dev_root: &Path, vid: u16, pid: u16) -> Option<PathBuf> {
    let product = format!("PRODUCT={vid:x}/{pid:x}/");
    let mut entries: Vec<_> = fs::read_dir(sysfs_root).ok()?.flatten().collect();
    entries.sort_by_key(|entry| entry.file_name());

    entries.into_iter().find_map(|entry| {
        let uevent = entry.path().join("device").join("uevent");
        let contents = fs::read_to_string(uevent).ok()?;
        if !contents.lines().any(|line| line.starts_with(&product)) {
            return None;
        }
        let node = dev_root.join(entry.file_name());
        node.exists().then_some(node)
    })
}
